//! JSON-RPC error envelopes for failures that happen before rmcp sees a request.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const SERVER_ERROR: i64 = -32000;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRpcHttpError {
    pub status: StatusCode,
    pub code: i64,
    pub message: String,
}

impl JsonRpcHttpError {
    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            code: SERVER_ERROR,
            message: "Method not allowed.".to_string(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: INTERNAL_ERROR,
            message: "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for JsonRpcHttpError {
    fn into_response(self) -> Response {
        let body = json!({
            "jsonrpc": "2.0",
            "error": { "code": self.code, "message": self.message },
            "id": null,
        });
        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
