//! Maps crate errors onto HTTP responses.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Error returned by handlers.
#[derive(Debug)]
pub struct AppError(pub Error);

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::AccountNotFound { .. } | Error::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidAmount { .. }
            | Error::Validation { .. }
            | Error::MalformedMessage { .. } => StatusCode::BAD_REQUEST,
            Error::MailRejected { .. } | Error::MailApi(_) => StatusCode::BAD_GATEWAY,
            Error::Config { .. }
            | Error::Database(_)
            | Error::UnbalancedTransaction { .. }
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Handler result.
pub type AppResult<T> = std::result::Result<T, AppError>;
