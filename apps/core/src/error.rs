//! Errors returned to callers of the chat service and config loader.

use thiserror::Error;

use crate::gateway::FailureKind;

/// Reasons a request is refused or the service cannot start.
///
/// Gateway failures are not represented here: they come back as a
/// `ChatResponse` carrying guidance text.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents request validation errors (e.g., an empty message).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., missing environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An attachment was refused before reaching the model gateway.
    #[error("Attachment rejected ({kind}): {reason}")]
    Attachment { kind: FailureKind, reason: String },
}

impl AppError {
    /// Failure category for errors that the caller should render as guidance
    /// rather than as a plain rejection.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AppError::Attachment { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}
