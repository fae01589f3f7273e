//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Every error response has the same JSON shape:
//!
//! ```json
//! {"error": "validation_error", "message": "Check-out date must be after check-in date"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use wayfarer_core::ValidationError;

use crate::db::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input broke a business rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No actor, or the actor does not exist.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The actor may not touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    /// HTTP status and machine-readable kind.
    #[must_use]
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Store(StoreError::ConstraintViolation(_)) => {
                (StatusCode::CONFLICT, "constraint_violation")
            }
            Self::Store(StoreError::NotFound { .. } | StoreError::MissingReference(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::Store(StoreError::Database(_) | StoreError::DataCorruption(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        // Don't expose internal error details to clients
        let message = match &self {
            _ if status.is_server_error() => "Internal server error".to_string(),
            Self::Store(StoreError::ConstraintViolation(constraint)) => {
                format!("Constraint violated: {constraint}")
            }
            Self::Store(StoreError::MissingReference(_)) => {
                "Referenced record does not exist".to_string()
            }
            _ => self.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                error: kind,
                message,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called once the request actor is known so errors are associated with them.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::db::Entity;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Forbidden("listing 7 belongs to another host".to_string());
        assert_eq!(
            err.to_string(),
            "Forbidden: listing 7 belongs to another host"
        );

        let err = AppError::Validation(ValidationError::CheckOutNotAfterCheckIn);
        assert_eq!(err.to_string(), "Check-out date must be after check-in date");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(ValidationError::NoGuests.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(StoreError::ConstraintViolation("one_review_per_booking".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(StoreError::not_found(Entity::Booking, 3).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(StoreError::MissingReference("booking_listing_id_fkey".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(StoreError::DataCorruption("bad row".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = render(
            ValidationError::TooManyGuests {
                max: 4,
                requested: 5,
            }
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(
            body["message"],
            "Number of guests exceeds maximum allowed (4)"
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) =
            render(StoreError::DataCorruption("listing 1: secret detail".into()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Internal server error");
    }
}
