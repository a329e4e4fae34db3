//! Streamable HTTP transport: `/mcp` plus `/health`.
//!
//! rmcp's [`StreamableHttpService`] does the JSON-RPC work. This module picks
//! stateless or session-backed operation, puts the method gate and session
//! tracking in front of it, and drains sessions on shutdown.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderName;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp_weather::NwsClient;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, TransportMode};
use crate::server::McuServer;

pub mod error;
pub mod gate;
pub mod health;
pub mod session;

pub use error::JsonRpcHttpError;
pub use session::{spawn_idle_sweeper, SessionBackend, SessionRegistry, SESSION_HEADER};

/// Interval between SSE keep-alive pings on rmcp's own streams.
const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Shared state for the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub mode: TransportMode,
    pub sse_compat: bool,
    pub sessions: SessionRegistry,
    pub started: Instant,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: &Config, shutdown: CancellationToken) -> Self {
        Self {
            mode: config.mode,
            sse_compat: config.sse_compat,
            sessions: SessionRegistry::new(),
            started: Instant::now(),
            started_at: chrono::Utc::now(),
            shutdown,
        }
    }
}

/// Turn a handler panic into a JSON-RPC internal error instead of a dropped
/// connection.
fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    JsonRpcHttpError::internal().into_response()
}

/// Build the axum router around a fresh rmcp service.
///
/// Returns the session manager too so the caller can evict and drain
/// sessions; it is unused in stateless mode.
pub fn router(config: &Config, state: AppState) -> (Router, Arc<LocalSessionManager>) {
    let manager = Arc::new(LocalSessionManager::default());
    let nws = NwsClient::new(config.nws_base_url.clone());

    let mcp_service = StreamableHttpService::new(
        move || Ok(McuServer::new(nws.clone())),
        Arc::clone(&manager),
        StreamableHttpServerConfig {
            stateful_mode: config.mode == TransportMode::Session,
            sse_keep_alive: Some(SSE_KEEP_ALIVE),
            ..Default::default()
        },
    );

    let mcp = Router::new()
        .route_service("/mcp", mcp_service)
        .route_layer(middleware::from_fn_with_state(state.clone(), gate::mcp_gate));

    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
        .expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    let router = Router::new()
        .route("/health", get(health::health))
        .merge(mcp)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    (router, manager)
}

/// Serve until `shutdown` is cancelled, then close every session and wait
/// for in-flight requests to finish.
pub async fn serve(config: &Config, listener: TcpListener, shutdown: CancellationToken) -> std::io::Result<()> {
    let state = AppState::new(config, shutdown.clone());
    let sessions = state.sessions.clone();
    let (router, manager) = router(config, state);

    let sweeper = (config.mode == TransportMode::Session).then(|| {
        spawn_idle_sweeper(
            sessions.clone(),
            Arc::clone(&manager),
            config.idle_timeout(),
            config.sweep_every(),
            shutdown.clone(),
        )
    });

    let addr = listener.local_addr()?;
    info!(
        %addr,
        mode = config.mode.as_str(),
        sse_compat = config.sse_compat,
        "MCP Streamable HTTP server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            let drained = sessions.close_all(manager.as_ref()).await;
            info!(drained, "closed sessions for shutdown");
        })
        .await?;

    if let Some(handle) = sweeper {
        let _ = handle.await;
    }

    info!("HTTP transport shut down");
    Ok(())
}
