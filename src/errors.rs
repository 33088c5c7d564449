use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Error structure returned on every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Which commit-time precondition was violated.
///
/// Callers use this to tell "the pallet cannot be moved" apart from
/// "the chosen destination is gone" and render the right message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precondition {
    /// The pallet is inactive or holds no slot.
    PalletUnavailable(Uuid),
    /// The slot was not free at the instant of commit.
    SlotUnavailable(Uuid),
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::PalletUnavailable(id) => {
                write!(f, "pallet {} is not available for this operation", id)
            }
            Precondition::SlotUnavailable(id) => {
                write!(f, "slot {} is not available as a destination", id)
            }
        }
    }
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(Precondition),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Convenience constructor for wrapping database errors.
    pub fn db_error(error: sea_orm::error::DbErr) -> Self {
        ServiceError::DatabaseError(error)
    }

    /// Unwraps SeaORM's transaction error wrapper back into a `ServiceError`.
    pub fn from_transaction(err: sea_orm::TransactionError<ServiceError>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            sea_orm::TransactionError::Transaction(service_err) => service_err,
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PreconditionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidState("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::PreconditionFailed(Precondition::SlotUnavailable(Uuid::nil()))
                .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::InternalError("connection pool exhausted".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::EventError("channel closed".into()).response_message(),
            "Internal server error"
        );

        // User-facing errors keep the actual message.
        assert_eq!(
            ServiceError::NotFound("Depot not found".into()).response_message(),
            "Not found: Depot not found"
        );
    }

    #[test]
    fn precondition_messages_are_distinguishable() {
        let pallet_side =
            ServiceError::PreconditionFailed(Precondition::PalletUnavailable(Uuid::nil()));
        let slot_side = ServiceError::PreconditionFailed(Precondition::SlotUnavailable(Uuid::nil()));
        assert!(pallet_side.to_string().contains("pallet"));
        assert!(slot_side.to_string().contains("slot"));
        assert_ne!(pallet_side.to_string(), slot_side.to_string());
    }
}
