// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::storage::StorageError;
use crate::views;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Email address already registered: {0}")]
    DuplicateEmail(String),

    #[error("Serial number already exists: {0}")]
    DuplicateSerial(String),

    #[error("Could not claim a free slug for {base:?} after {attempts} write conflicts")]
    SlugConflict { base: String, attempts: u32 },
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::DuplicateEmail(_)
            | AppError::DuplicateSerial(_)
            | AppError::SlugConflict { .. } => StatusCode::CONFLICT,
            AppError::Storage(StorageError::UniqueViolation(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "AUTH_002",
            AppError::AuthRateLimited => "AUTH_003",
            AppError::Internal(_) => "INT_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Storage(StorageError::UniqueViolation(_)) => "DB_002",
            AppError::Storage(_) => "DB_001",
            AppError::DuplicateEmail(_) => "VAL_002",
            AppError::DuplicateSerial(_) => "VAL_003",
            AppError::SlugConflict { .. } => "SLUG_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid email or password.".to_string(),
            AppError::AuthRateLimited => {
                "Too many login attempts, please try again later".to_string()
            },
            AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
            AppError::Storage(StorageError::UniqueViolation(_)) => {
                "That record conflicts with an existing one".to_string()
            },
            AppError::Storage(_) => "An internal server error occurred".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::DuplicateEmail(_) => {
                "Email address already exists. Please log in.".to_string()
            },
            AppError::DuplicateSerial(_) => {
                "Serial number already exists. Please use a unique serial number.".to_string()
            },
            AppError::SlugConflict { .. } => {
                "The asset could not be saved right now, please try again".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }

        if status == StatusCode::NOT_FOUND {
            return (status, Html(views::not_found_page())).into_response();
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        (status, Html(views::error_page(status, self.error_code(), &message))).into_response()
    }
}
