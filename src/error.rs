use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::auth::password::PasswordError;
use crate::auth::ResetTokenError;
use crate::db::StoreError;

/// Shown for every reset-token failure so callers cannot tell an expired
/// link from a forged one.
pub const INVALID_RESET_LINK: &str = "Invalid or expired reset link";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    RateLimited(u64),
    Internal(String),
    Store(StoreError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::RateLimited(secs) => write!(f, "Rate Limited: retry after {secs}s"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Store(err) => write!(f, "Store Error: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimited(secs) => {
                let body = json!({ "error": "Too many reset requests. Please try again later." });
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", secs.to_string())],
                    axum::Json(body),
                )
                    .into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Store(err) => {
                tracing::error!("Account store error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => AppError::BadRequest(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ResetTokenError> for AppError {
    fn from(err: ResetTokenError) -> Self {
        match err {
            ResetTokenError::InvalidToken => AppError::BadRequest(INVALID_RESET_LINK.to_string()),
            ResetTokenError::WrongClaimKind { found } => {
                tracing::warn!(kind = %found, "Rejected non-reset token on reset endpoint");
                AppError::BadRequest(INVALID_RESET_LINK.to_string())
            }
            ResetTokenError::Signing(reason) => AppError::Internal(reason),
        }
    }
}
