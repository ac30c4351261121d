//! Error types for the web app.
//!
//! ## Mapping
//! ```text
//! CoreError::NotFound            → 404 NOT_FOUND
//! CoreError::InsufficientStock   → 409 INSUFFICIENT_STOCK
//! CoreError::DeleteRestricted    → 409 DELETE_RESTRICTED
//! ValidationError::Duplicate     → 409 DUPLICATE
//! CoreError::EmptyOrder          → 422 EMPTY_ORDER
//! ValidationError (other)        → 422 VALIDATION_FAILED
//! DbError::UniqueViolation / FK  → 409 CONFLICT
//! DbError (infrastructure)       → 500 INTERNAL, generic message, logged
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockbook_core::{CoreError, ValidationError};
use stockbook_db::DbError;
use tracing::error;

/// Machine-readable error code in the JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    InsufficientStock,
    EmptyOrder,
    DeleteRestricted,
    Duplicate,
    ValidationFailed,
    Conflict,
    Unauthorized,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock
            | ErrorCode::DeleteRestricted
            | ErrorCode::Duplicate
            | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::EmptyOrder | ErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        let code = match error {
            ValidationError::Duplicate { .. } => ErrorCode::Duplicate,
            _ => ErrorCode::ValidationFailed,
        };
        ApiError::new(code, error.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        if let CoreError::Validation(inner) = error {
            return ApiError::from(inner);
        }
        let code = match &error {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::EmptyOrder => ErrorCode::EmptyOrder,
            CoreError::DeleteRestricted { .. } => ErrorCode::DeleteRestricted,
            CoreError::Validation(_) => ErrorCode::ValidationFailed,
        };
        ApiError::new(code, error.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::Domain(core) => ApiError::from(core),
            conflict @ (DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. }) => {
                ApiError::new(ErrorCode::Conflict, conflict.to_string())
            }
            other => {
                error!(error = %other, "Database failure");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_message() {
        let err = ApiError::from(DbError::Domain(CoreError::InsufficientStock {
            sku: "P1".to_string(),
            available: 2,
            requested: 10,
        }));
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("P1"));
    }

    #[test]
    fn test_validation_codes() {
        let duplicate = ApiError::from(CoreError::Validation(ValidationError::Duplicate {
            field: "sku".to_string(),
            value: "P1".to_string(),
        }));
        assert_eq!(duplicate.code, ErrorCode::Duplicate);

        let required = ApiError::from(ValidationError::Required {
            field: "name".to_string(),
        });
        assert_eq!(required.code.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(ApiError::from(CoreError::EmptyOrder).code, ErrorCode::EmptyOrder);
    }

    #[test]
    fn test_infrastructure_detail_is_hidden() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error at page 7".to_string()));
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_json_shape() {
        let body = serde_json::to_value(ApiError::from(CoreError::not_found("Order", "o1"))).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Order not found: o1");
    }
}
