// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Kind of registry a plugin lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Sanitizer,
    Frame,
    Previewer,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PluginKind::Sanitizer => "sanitizer",
            PluginKind::Frame => "frame",
            PluginKind::Previewer => "previewer",
        };
        f.write_str(label)
    }
}

/// Errors raised by the previewing engine.
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    /// Registry lookup miss. Always a configuration mistake.
    #[error("unknown {kind} plugin '{name}'")]
    UnknownPlugin { kind: PluginKind, name: String },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: PluginKind, name: String },

    #[error("previewer '{0}' has an empty sanitizer chain")]
    EmptyChain(String),

    #[error("sanitizer '{plugin}' failed: {message}")]
    SanitizationFailure { plugin: String, message: String },

    #[error("frame '{frame}' failed: {message}")]
    InjectionFailure { frame: String, message: String },

    #[error("could not canonicalize HTML: {0}")]
    CanonicalizationFailure(String),

    #[error("no previewer named '{0}'")]
    UnknownPreviewer(String),

    #[error("no container with id '{0}'")]
    UnknownContainer(String),

    #[error("no diff view with id '{0}'")]
    UnknownDiff(uuid::Uuid),

    #[error("unknown layout flag '{0}'")]
    UnknownFlag(String),
}

impl WorkbenchError {
    pub fn unknown_sanitizer(name: &str) -> Self {
        Self::UnknownPlugin {
            kind: PluginKind::Sanitizer,
            name: name.to_string(),
        }
    }

    pub fn unknown_frame(name: &str) -> Self {
        Self::UnknownPlugin {
            kind: PluginKind::Frame,
            name: name.to_string(),
        }
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (configuration rejected by the engine)
    Unprocessable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps engine errors onto HTTP semantics.
/// Configuration problems are the caller's fault, lookups of things that
/// do not exist are 404s.
impl From<WorkbenchError> for AppError {
    fn from(err: WorkbenchError) -> Self {
        match err {
            WorkbenchError::UnknownPlugin { .. }
            | WorkbenchError::DuplicateName { .. }
            | WorkbenchError::EmptyChain(_) => AppError::Unprocessable(err.to_string()),
            WorkbenchError::UnknownFlag(_) => AppError::BadRequest(err.to_string()),
            WorkbenchError::UnknownPreviewer(_)
            | WorkbenchError::UnknownContainer(_)
            | WorkbenchError::UnknownDiff(_) => AppError::NotFound(err.to_string()),
            WorkbenchError::SanitizationFailure { .. }
            | WorkbenchError::InjectionFailure { .. }
            | WorkbenchError::CanonicalizationFailure(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
