use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use sqlx::Error as SqlxError;
use std::env::VarError;
use thiserror::Error;

use crate::forms::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{field}: {message}")]
    Uniqueness {
        field: &'static str,
        message: String,
    },

    #[error("Not found")]
    NotFound,

    /// Reported to clients exactly like [`AppError::NotFound`].
    #[error("Not found")]
    CrossTenant { actor_caffe: i64, owner_caffe: i64 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Password error: {0}")]
    PasswordError(String),

    #[error("Identity error: {0}")]
    IdentityError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.add(field, message);
        AppError::Validation(errors)
    }

    /// Translates a unique-index violation into a field error on `field`;
    /// everything else stays a database error.
    pub fn from_insert(err: SqlxError, field: &'static str, message: &str) -> Self {
        match err {
            SqlxError::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Uniqueness {
                    field,
                    message: message.to_owned(),
                }
            }
            other => AppError::DatabaseError(other),
        }
    }

    /// Field errors this error carries, if it is user-correctable.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors.clone()),
            AppError::Uniqueness { field, message } => {
                let mut errors = FieldErrors::default();
                errors.add(field, message.clone());
                Some(errors)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound | AppError::CrossTenant { .. })
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Uniqueness { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::CrossTenant { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MigrateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PasswordError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IdentityError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::EnvVarError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Some(errors) = self.field_errors() {
            return HttpResponse::build(self.status_code()).json(json!({ "errors": errors }));
        }
        match self.status_code() {
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => {
                HttpResponse::build(self.status_code()).body(self.to_string())
            }
            status => {
                log::error!("Request failed: {}", self);
                HttpResponse::build(status).body("Internal server error")
            }
        }
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
