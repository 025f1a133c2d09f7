use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error")]
    Validation(serde_json::Value),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Validation failure reported by the `validator` derive, keeping the
    /// field-keyed structure intact.
    pub fn validation(errors: &validator::ValidationErrors) -> Self {
        let value = serde_json::to_value(errors).unwrap_or_else(|_| {
            serde_json::json!({ "_": [{ "code": "invalid", "message": errors.to_string() }] })
        });
        AppError::Validation(value)
    }

    /// Single hand-built field error for checks the derive cannot express
    /// (slug uniqueness, parent existence, parent cycles).
    pub fn field_validation(field: &str, code: &str, message: &str) -> Self {
        AppError::Validation(serde_json::json!({
            field: [{ "code": code, "message": message }]
        }))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed".to_string(),
                Some(errors),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_validation_shape() {
        let err = AppError::field_validation("slug", "duplicate", "Slug is already taken");
        match err {
            AppError::Validation(value) => {
                let messages = value.get("slug").and_then(|v| v.as_array()).unwrap();
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0]["code"], "duplicate");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
