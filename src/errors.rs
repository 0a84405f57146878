use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Submission failed validation; one message per problem.
    Validation(Vec<String>),
    /// Bad request error (malformed input).
    BadRequest(String),
    /// Resource not found error.
    NotFound(String),
    /// Same contact submitted again inside the cooldown window.
    RateLimited(String),
    /// Reading or writing the lead file failed.
    StorageError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(messages) => {
                write!(f, "Validation failed: {}", messages.join("; "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Status code and the message that is safe to show to the caller.
    ///
    /// Server-side failures are logged here and replaced by a generic message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(messages) => {
                (StatusCode::UNPROCESSABLE_ENTITY, messages.join("; "))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RateLimited(msg) => {
                tracing::warn!("Submission throttled: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, msg.clone())
            }
            AppError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not save or read submissions".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                source.status_and_message()
            }
        }
    }

    /// Validation messages, looking through any context wrappers.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            AppError::Validation(messages) => Some(messages),
            AppError::WithContext { source, .. } => source.validation_messages(),
            _ => None,
        }
    }

    /// Renders the error as an HTML failure page for the browser-facing routes.
    pub fn into_page(self, brand_name: &str, title: &str) -> Response {
        let (status, message) = self.status_and_message();
        (
            status,
            Html(crate::pages::error_page(brand_name, title, status, &message)),
        )
            .into_response()
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = match self.validation_messages() {
            Some(details) => Json(json!({
                "error": "Validation failed",
                "details": details,
            })),
            None => Json(json!({
                "error": error_message,
            })),
        };

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}
