use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use actix_web::{
    error::ResponseError,
    http::{header::{ContentType, RETRY_AFTER}, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    RateLimited { retry_after_secs: u64 },
    BotCheckFailed(String),
    NotFound(String),
    ForbiddenAccess,
    StorageUnavailable(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::RateLimited { retry_after_secs } => {
                write!(f, "Rate limited, retry after {}s", retry_after_secs)
            }
            AppError::BotCheckFailed(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ForbiddenAccess => write!(f, "Forbidden access"),
            AppError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            AppError::RateLimited { .. } => {
                serde_json::json!({"error": "Too many requests, please try again later."})
            }
            AppError::StorageUnavailable(msg) => {
                tracing::error!("Storage unavailable: {}", msg);
                serde_json::json!({"error": "Service temporarily unavailable, please try again later."})
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                serde_json::json!({"error": "Internal server error"})
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());
        if let AppError::RateLimited { retry_after_secs } = self {
            response.insert_header((RETRY_AFTER, retry_after_secs.to_string()));
        }
        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::BotCheckFailed(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ForbiddenAccess => StatusCode::FORBIDDEN,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ThrottleError> for AppError {
    fn from(err: ThrottleError) -> Self {
        match err {
            ThrottleError::RateLimitExceeded { retry_after } => AppError::RateLimited {
                // Never advertise zero; the client would retry immediately.
                retry_after_secs: retry_after.as_secs_f64().ceil().max(1.0) as u64,
            },
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<BotCheckError> for AppError {
    fn from(err: BotCheckError) -> Self {
        match err {
            BotCheckError::MissingToken => {
                AppError::BotCheckFailed("reCAPTCHA verification is required".into())
            }
            BotCheckError::Rejected => {
                AppError::BotCheckFailed("reCAPTCHA verification failed".into())
            }
            BotCheckError::Transport(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Rejection from the request throttle.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    #[display("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimitExceeded { retry_after: Duration },
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[display("Identity already registered")]
    AlreadyExists,

    #[display("Subscription storage unavailable: {_0}")]
    StorageUnavailable(String),
}

impl From<DatabaseError> for GuardError {
    fn from(err: DatabaseError) -> Self {
        GuardError::StorageUnavailable(err.to_string())
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        match err {
            // Callers answer duplicates themselves; reaching here is a bug.
            GuardError::AlreadyExists => AppError::InternalError(err.to_string()),
            GuardError::StorageUnavailable(msg) => AppError::StorageUnavailable(msg),
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[display("Constraint violation: {_0}")]
    ConstraintViolation(String),

    #[display("Connection error: {_0}")]
    ConnectionError(String),

    #[display("Query error: {_0}")]
    QueryError(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                DatabaseError::ConstraintViolation(e.message().to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => DatabaseError::ConnectionError(err.to_string()),
            _ => DatabaseError::QueryError(err.to_string()),
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum BotCheckError {
    #[display("Missing bot verification token")]
    MissingToken,

    #[display("Bot verification rejected the token")]
    Rejected,

    #[display("Bot verification request failed: {_0}")]
    Transport(String),
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MailError {
    #[display("Mail relay unreachable: {_0}")]
    Transport(String),

    #[display("Mail relay rejected message with status {_0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
