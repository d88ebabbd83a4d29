//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::contacts::ContactError;
use crate::report::ReportError;
use crate::store::{FieldErrors, StoreError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Form validation failed; messages keyed by field
    #[error("{message}")]
    InvalidFields { message: String, fields: FieldErrors },

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Invalid(fields) => ApiError::InvalidFields {
                message: ContactError::Invalid(fields.clone()).to_string(),
                fields,
            },
            ContactError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ContactError::Query(_) | ContactError::Import(_) => {
                ApiError::Validation(err.to_string())
            }
            ContactError::Store(e) => ApiError::Storage(e),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Invalid(fields) => ApiError::InvalidFields {
                message: ReportError::Invalid(fields.clone()).to_string(),
                fields,
            },
            ReportError::NotFound(_) | ReportError::TemplateNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            ReportError::Store(e) => ApiError::Storage(e),
            ReportError::Export(_) => ApiError::Internal(err.to_string()),
            ReportError::UnknownEntity(_)
            | ReportError::UnknownField { .. }
            | ReportError::IncompatibleOperator { .. }
            | ReportError::InvalidFilterValue { .. }
            | ReportError::Parse(_) => ApiError::Validation(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::InvalidFields { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Storage(StoreError::Duplicate(_)) => (StatusCode::CONFLICT, "DUPLICATE"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let message = self.to_string();
        let fields = match self {
            ApiError::InvalidFields { fields, .. } => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                fields,
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
