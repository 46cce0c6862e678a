//! Error to HTTP response mapping.
//!
//! Every error a handler can surface knows its own code and status. Server
//! errors are logged here and answered with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use navette_db::{BookingRepositoryError, CashSessionRepositoryError, FareError};
use navette_shared::AppError;

/// An error that can be rendered as `{"error": CODE, "message": text}`.
pub trait ApiError: std::fmt::Display {
    /// Machine-readable code.
    fn error_code(&self) -> &'static str;

    /// HTTP status.
    fn http_status_code(&self) -> u16;
}

impl ApiError for BookingRepositoryError {
    fn error_code(&self) -> &'static str {
        Self::error_code(self)
    }

    fn http_status_code(&self) -> u16 {
        Self::http_status_code(self)
    }
}

impl ApiError for CashSessionRepositoryError {
    fn error_code(&self) -> &'static str {
        Self::error_code(self)
    }

    fn http_status_code(&self) -> u16 {
        Self::http_status_code(self)
    }
}

impl ApiError for FareError {
    fn error_code(&self) -> &'static str {
        Self::error_code(self)
    }

    fn http_status_code(&self) -> u16 {
        Self::http_status_code(self)
    }
}

impl ApiError for AppError {
    fn error_code(&self) -> &'static str {
        Self::error_code(self)
    }

    fn http_status_code(&self) -> u16 {
        self.status_code()
    }
}

/// Builds the JSON error response for `err`.
pub fn error_response<E: ApiError>(err: &E) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(error = %err, code = err.error_code(), "Request failed");
        return (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}
