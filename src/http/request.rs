//! Request helpers.
//!
//! The request ID is assigned by the middleware stack before any handler
//! runs and echoed back on the response.

use axum::http::HeaderMap;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID of the current request, for log correlation.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
