//! Logging middleware
//!
//! One line per completed request, tagged with the request id so log lines
//! can be joined with the id echoed in error envelopes.

use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

use crate::middleware::request_id::current_request_id;

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    let request_id = current_request_id().unwrap_or_default();

    // 404s are mostly scanners; keep them out of the warn stream
    if response.status().is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status,
            duration_ms = %format!("{:.2}", duration_ms),
            request_id = %request_id,
            "Request completed with server error"
        );
    } else if response.status().is_client_error() && response.status() != StatusCode::NOT_FOUND {
        warn!(
            method = %method,
            path = %path,
            status,
            duration_ms = %format!("{:.2}", duration_ms),
            request_id = %request_id,
            "Request completed with client error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status,
            duration_ms = %format!("{:.2}", duration_ms),
            request_id = %request_id,
            "Request completed"
        );
    }

    response
}
