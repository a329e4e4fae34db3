//! rmcp-material: MCP server for Material Design color schemes
//!
//! Run with: `rmcp-material` (serves on stdio)

use rmcp::ServiceExt;
use rmcp_material::MaterialServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (to stderr so it doesn't interfere with stdio transport)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting rmcp-material server");

    let server = MaterialServer::new();
    let service = server.serve(rmcp::transport::stdio()).await?;

    service.waiting().await?;

    tracing::info!("rmcp-material server stopped");
    Ok(())
}
