use clap::Parser;
use mcu_mcp::{http, Config, LogFormat, McuServer};
use rmcp::{transport::stdio, ServiceExt};
use rmcp_weather::NwsClient;
use tokio_util::sync::CancellationToken;

fn init_tracing(format: LogFormat) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_format);
    config.validate()?;

    if config.stdio {
        tracing::info!("mcu-mcp starting on stdio...");
        let server = McuServer::new(NwsClient::new(config.nws_base_url.clone()));
        let service = server.serve(stdio()).await?;
        service.waiting().await?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr()?).await?;
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutting down server...");
        signal_token.cancel();
    });

    http::serve(&config, listener, shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = ctrl_c.await {
            tracing::error!(error = %e, "ctrl-c signal handler failed");
        }
    }
}
