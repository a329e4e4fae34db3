//! Middleware in front of the rmcp service on `/mcp`.
//!
//! Stateless mode only lets POST through. Session mode also allows the GET
//! stream and DELETE, and records activity for every session id that appears
//! on a request or response.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::error::JsonRpcHttpError;
use super::session::SESSION_HEADER;
use super::AppState;
use crate::config::TransportMode;

const KEEPALIVE_EVERY: Duration = Duration::from_secs(30);

pub async fn mcp_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state.mode {
        TransportMode::Stateless => stateless(&state, request, next).await,
        TransportMode::Session => tracked(&state, request, next).await,
    }
}

async fn stateless(state: &AppState, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    if method == Method::POST {
        return next.run(request).await;
    }
    if method == Method::GET && state.sse_compat {
        info!("opening keep-alive event stream for GET client");
        return keepalive_stream(state.shutdown.clone()).into_response();
    }
    debug!(%method, "rejecting non-POST request in stateless mode");
    JsonRpcHttpError::method_not_allowed().into_response()
}

/// An event stream that never carries events, only keep-alive comments,
/// and ends when the server shuts down.
fn keepalive_stream(
    shutdown: CancellationToken,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let stream = futures::stream::pending::<Result<Event, Infallible>>()
        .take_until(shutdown.cancelled_owned());
    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEPALIVE_EVERY).text("keepalive"))
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .filter(|v| !v.is_empty())
}

async fn tracked(state: &AppState, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    if !matches!(method, Method::GET | Method::POST | Method::DELETE) {
        debug!(%method, "rejecting unsupported method in session mode");
        return JsonRpcHttpError::method_not_allowed().into_response();
    }
    let requested = session_id(request.headers());

    let response = next.run(request).await;
    let status = response.status();

    if method == Method::DELETE {
        if let Some(id) = requested.as_deref().filter(|_| status.is_success()) {
            if state.sessions.remove(id).await.is_some() {
                info!(session_id = %id, "session closed by client");
            }
        }
        return response;
    }

    if status.is_success() {
        if let Some(id) = session_id(response.headers()).or(requested) {
            if state.sessions.touch(&id).await {
                info!(session_id = %id, "session created");
            }
        }
    } else if matches!(status, StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED) {
        let Some(id) = requested else {
            return response;
        };
        // rmcp no longer knows this session; stop counting it.
        if state.sessions.remove(&id).await.is_some() {
            debug!(session_id = %id, %status, "dropping session rejected by transport");
        }
    }

    response
}
