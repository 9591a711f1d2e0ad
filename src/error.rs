// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::permissions::PermissionError;
use crate::types::TypeError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidJson(String),

    // 401 Unauthorized
    NotEnoughPermission(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity
    ObjectIdInvalid(String),
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidJson(_) => 400,
            ApiError::NotEnoughPermission(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::ObjectIdInvalid(_) => 422,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidJson(msg) => msg,
            ApiError::NotEnoughPermission(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::ObjectIdInvalid(msg) => msg,
            ApiError::UnprocessableEntity(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::NotEnoughPermission(_) => "NOT_ENOUGH_PERMISSION",
            ApiError::NotFound(_) => "DATA_NOT_FOUND",
            ApiError::ObjectIdInvalid(_) => "OBJECT_ID_INVALID",
            ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn not_enough_permission(message: impl Into<String>) -> Self {
        ApiError::NotEnoughPermission(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<PermissionError> for ApiError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::ObjectIdInvalid(msg) => ApiError::ObjectIdInvalid(msg),
            PermissionError::DataNotFound(msg) => ApiError::not_found(msg),
            PermissionError::Custom(msg) => ApiError::unprocessable_entity(msg),
            PermissionError::NotEnoughPermission(msg) => ApiError::not_enough_permission(msg),
            PermissionError::Store(e) => e.into(),
            PermissionError::Tree(e) => {
                tracing::error!("Menu tree error: {}", e);
                ApiError::internal_server_error(e.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            StoreError::Duplicate(what) => {
                ApiError::unprocessable_entity(format!("{} already exists", what))
            }
            StoreError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error(sqlx_err.to_string())
            }
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<TypeError> for ApiError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::ObjectIdInvalid(_) => ApiError::ObjectIdInvalid(err.to_string()),
            other => ApiError::unprocessable_entity(other.to_string()),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
