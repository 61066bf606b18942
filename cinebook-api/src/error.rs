use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use cinebook_catalog::CatalogError;
use cinebook_core::{ReservationError, ReservationOutcome};
use cinebook_shared::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),
    #[error("Forbidden: {0}")]
    AuthorizationError(String),
    #[error("Invalid request: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Storage failed mid-reservation; the outcome holds what was already booked.
    #[error("Reservation interrupted: {reason}")]
    Interrupted {
        outcome: ReservationOutcome,
        reason: String,
    },
    #[error("Internal error: {0}")]
    InternalServerError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": "Service temporarily unavailable" }))
            }
            AppError::Interrupted { outcome, reason } => {
                tracing::warn!("Reservation interrupted: {}", reason);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "Reservation interrupted by a storage failure", "outcome": outcome }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::EmptySelection => AppError::ValidationError(err.to_string()),
            ReservationError::ShowingNotFound(_) => AppError::NotFoundError(err.to_string()),
            ReservationError::StorageUnavailable(msg) => AppError::ServiceUnavailable(msg),
            ReservationError::Interrupted { outcome, reason } => AppError::Interrupted { outcome, reason },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
