use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::core::config::Environment;
use crate::modules::storage::StorageError;
use crate::shared::types::ApiResponse;

/// Message shown in production for errors that are not safe to expose
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    DuplicateUser(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Cannot unlink the last remaining identity")]
    LastIdentity,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// One `Field '<name>': <message>` line per violated rule.
    pub fn from_validation(errors: ValidationErrors) -> Self {
        let mut lines = Vec::new();
        collect_violations(None, &errors, &mut lines);
        lines.sort();
        AppError::Validation(lines)
    }

    /// Expected, client-facing failures. Anything else is a fault whose
    /// details are hidden in production.
    pub fn is_operational(&self) -> bool {
        match self {
            AppError::Database(_) | AppError::Internal(_) => false,
            AppError::Storage(e) => !matches!(
                e,
                StorageError::Configuration(_) | StorageError::Io(_)
            ),
            _ => true,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::LastIdentity | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(e) => match e {
                StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
                StorageError::UnknownProvider { .. } => StatusCode::BAD_REQUEST,
                StorageError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
                StorageError::Io(_) => StatusCode::BAD_GATEWAY,
                StorageError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Returns true when a database error is a unique-constraint violation.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        err.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
    }
}

fn collect_violations(prefix: Option<&str>, errors: &ValidationErrors, lines: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(violations) => {
                for violation in violations {
                    let message = violation
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' validation", violation.code));
                    lines.push(format!("Field '{}': {}", name, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(Some(&name), inner, lines),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_violations(Some(&format!("{}[{}]", name, index)), inner, lines);
                }
            }
        }
    }
}

/// Everything the error-mapping middleware needs to render an error for the
/// current environment. Attached to every error response as an extension.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<Vec<String>>,
    pub operational: bool,
    /// Debug rendering of the original error
    pub stack: String,
}

impl ErrorReport {
    pub fn render(&self, environment: Environment) -> Response {
        let (status, message, errors) = if environment.is_production() && !self.operational {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR_MESSAGE.to_string(),
                None,
            )
        } else {
            (self.status, self.message.clone(), self.errors.clone())
        };

        let mut body = ApiResponse::<()>::error(Some(message), errors);
        body.code = Some(status.as_u16());
        if environment == Environment::Development {
            body.stack = Some(self.stack.clone());
        }

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self.clone());
        response
    }
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        let errors = match err {
            AppError::Validation(lines) => Some(lines.clone()),
            _ => None,
        };
        let message = match err {
            AppError::Validation(lines) => lines.join("\n"),
            other => other.to_string(),
        };

        ErrorReport {
            status: err.status_code(),
            message,
            errors,
            operational: err.is_operational(),
            stack: format!("{:?}", err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_operational() {
            tracing::debug!("Request failed: {}", self);
        } else {
            tracing::error!("Request failed: {:?}", self);
        }

        // Production rendering until the error-mapping middleware applies
        // the configured environment.
        ErrorReport::from(&self).render(Environment::Production)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
