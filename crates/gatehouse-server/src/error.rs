use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// Everything the registration and auth surface can answer short of success.
///
/// All variants are user-facing and scoped to one request; the structured
/// `{success, message}` body is the contract, so workflow rejections answer
/// 200 with `success: false` rather than an error status. Storage failures
/// are logged and answered with a generic message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Email already registered")]
    AlreadyRegistered,

    #[error("No pending verification found")]
    NotFound,

    #[error("Invalid verification code")]
    Mismatch,

    #[error("Verification code has expired")]
    Expired,

    #[error("Email is already verified")]
    AlreadyVerified,

    #[error("Failed to send verification email")]
    DeliveryFailed,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl AppError {
    /// Message shown to the caller. Storage internals never leak.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Storage(_) => "Failed to process request".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Storage(e) => {
                error!("Storage error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        };

        let body = Json(serde_json::json!({
            "success": false,
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}
