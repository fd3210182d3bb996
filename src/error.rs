use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Named outcomes of an admission attempt. These are expected results, not failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("event not found")]
    EventNotFound,
    #[error("registration not open")]
    RegistrationNotOpen,
    #[error("registration deadline passed")]
    RegistrationDeadlinePassed,
    #[error("registration full")]
    RegistrationFull,
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::EventNotFound => "event_not_found",
            Rejection::RegistrationNotOpen => "registration_not_open",
            Rejection::RegistrationDeadlinePassed => "registration_deadline_passed",
            Rejection::RegistrationFull => "registration_full",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("Registration rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error("Migration {version} failed: {source}")]
    Migration {
        version: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation { field, message: message.into() }
    }

    /// True when the underlying driver reported a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) => is_unique_violation(e),
            _ => false,
        }
    }
}

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error.as_database_error() {
        Some(db_err) => {
            if db_err.is_unique_violation() {
                return true;
            }
            // 2067 / 1555 = SQLite unique / primary key constraint
            // 23505 = PostgreSQL unique violation
            let code = db_err.code().unwrap_or_default();
            code == "2067" || code == "1555" || code == "23505"
        }
        None => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)" })),
                    )
                        .into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal server error" }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "field": field }),
            ),
            AppError::Rejected(rejection) => {
                let status = match rejection {
                    Rejection::EventNotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::CONFLICT,
                };
                (status, json!({ "error": rejection.to_string(), "code": rejection.code() }))
            }
            AppError::Migration { version, source } => {
                error!("Migration {} failed: {:?}", version, source);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal error" }))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}
