//! Request id middleware
//!
//! Every request gets a uuid that rides along in a task-local, shows up as
//! an `x-request-id` response header, and is embedded into error envelopes
//! for log correlation.

use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_ID: Uuid;
}

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The current request's id, when called from inside a request task
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.to_string()).ok()
}

/// Request id middleware
pub async fn request_id_middleware(request: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4();

    let mut response = REQUEST_ID.scope(id, next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
