use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{services::DeliveryError, validation::ValidationError};

pub enum AppError {
    /// Internal errors - logged but return generic 500 to user
    Internal(anyhow::Error),
    /// User-facing errors - message is safe to show
    External(StatusCode, &'static str),
    /// Field-level validation issues - safe to show
    Validation(ValidationError),
    /// Client exceeded the submission rate for this endpoint
    RateLimited,
    /// Mail provider failed; details are logged, not returned
    Delivery(DeliveryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                sentry::capture_error(
                    err.as_ref() as &(dyn std::error::Error + Send + Sync + 'static)
                );

                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::External(status, msg) => error_body(status, msg),
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation failed",
                    "details": err.issues,
                })),
            )
                .into_response(),
            AppError::RateLimited => error_body(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.",
            ),
            AppError::Delivery(err) => {
                tracing::error!(error = %err, "email delivery failed");

                match err {
                    DeliveryError::Rejected(_) => {
                        error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email")
                    }
                    DeliveryError::Unavailable(_) => error_body(
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Email service temporarily unavailable",
                    ),
                }
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
