//! Response envelopes and error mapping.
//!
//! Success bodies are `{"data": ...}`; errors are `{"message": "..."}`.
//! Settings errors map to 400 when the caller sent something unacceptable
//! and to 500 otherwise. Storage messages are already sanitized by the time
//! they reach here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::settings::SettingsError;

#[derive(Debug, Serialize)]
pub struct OkResponse<T> {
    pub data: T,
}

/// Wrap `data` in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<OkResponse<T>> {
    Json(OkResponse { data })
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Invalid or missing API key")
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}
