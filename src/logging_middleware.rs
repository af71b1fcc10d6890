// src/logging_middleware.rs
//! Debug-mode request/response body logging. Bodies only surface at the
//! `debug` tracing level; production filters never emit them, which keeps
//! upstream error detail out of normal logs.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Render a body for the log, pretty-printing JSON when it parses.
fn printable(bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string())),
        Err(_) => Some(text.to_string()),
    }
}

pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body_str) = printable(&bytes) {
        debug!(
            method = %parts.method,
            uri = %parts.uri,
            request_body = %body_str,
            "📥 Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body_str) = printable(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %body_str,
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
