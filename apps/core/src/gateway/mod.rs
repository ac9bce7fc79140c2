//! External model gateway.
//!
//! [`ModelGateway`] is the seam between the routing core and whatever produces
//! the reply: the Gemini REST adapter or the deterministic rule-based adapter.
//! The adapter is chosen once at startup from configuration.

pub mod fallback;
pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::brain::PromptPayload;
use crate::models::Attachment;

pub use fallback::RuleBasedGateway;
pub use gemini::GeminiGateway;

/// Reminder appended to every failure message.
pub const EMERGENCY_REMINDER: &str = "Emergency Note: If you are in immediate danger, do not wait for this assistant. Call 911 or your local emergency services right away.";

/// Reply text or a classified failure
pub type ModelResult = Result<String, GatewayError>;

/// Defines the public interface for a reply generator.
///
/// Implementations must be safe to share across tasks; the core never holds
/// a lock while awaiting `invoke`.
#[async_trait]
pub trait ModelGateway: Send + Sync + 'static {
    /// Sends the composed prompt, and optionally one attachment, to the model.
    async fn invoke(&self, prompt: &PromptPayload, attachment: Option<&Attachment>) -> ModelResult;

    /// Short adapter name for logs.
    fn name(&self) -> &'static str;
}

/// Closed set of gateway failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Authentication,
    RateLimited,
    Network,
    ServiceUnavailable,
    MalformedResponse,
    FileTooLarge,
    UnsupportedFormat,
    Unknown,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Authentication => "authentication",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Network => "network",
            FailureKind::ServiceUnavailable => "service_unavailable",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::FileTooLarge => "file_too_large",
            FailureKind::UnsupportedFormat => "unsupported_format",
            FailureKind::Unknown => "unknown",
        }
    }

    /// Explanation shown to the user, always ending with [`EMERGENCY_REMINDER`].
    pub fn user_guidance(&self) -> String {
        let body = match self {
            FailureKind::Authentication => {
                "Server Status: Authentication Failed\n\n\
                 The AI service rejected our credentials. This usually means an invalid or \
                 expired API key, or an account access issue.\n\n\
                 What you can do:\n\
                 - Ask the administrator to verify the API key\n\
                 - Try again once the key has been renewed"
            }
            FailureKind::RateLimited => {
                "Server Status: Service Quota Exceeded\n\n\
                 The AI service has reached its usage limits or is rate limiting requests.\n\n\
                 What you can do:\n\
                 - Wait a few minutes and try again\n\
                 - Ask the administrator for a quota increase"
            }
            FailureKind::Network => {
                "Server Status: Network Connection Issues\n\n\
                 We could not reach the AI service. The connection failed or timed out.\n\n\
                 What you can do:\n\
                 - Check your internet connection\n\
                 - Try again in a few minutes"
            }
            FailureKind::ServiceUnavailable => {
                "Server Status: AI Service Temporarily Down\n\n\
                 The AI service is experiencing an outage or maintenance.\n\n\
                 What you can do:\n\
                 - Check back in 10-15 minutes"
            }
            FailureKind::MalformedResponse => {
                "Server Status: Invalid Response Format\n\n\
                 The AI service replied with something we could not read, or with no content.\n\n\
                 What you can do:\n\
                 - Try your request again\n\
                 - Rephrase or simplify your message"
            }
            FailureKind::FileTooLarge => {
                "File Too Large for Analysis\n\n\
                 Your file exceeds the processing limits.\n\n\
                 What you can do:\n\
                 - Try a smaller file (under 10MB)\n\
                 - Describe the file content in text"
            }
            FailureKind::UnsupportedFormat => {
                "Unsupported File Format\n\n\
                 The file format cannot be processed.\n\n\
                 Supported formats:\n\
                 - Images: JPG, PNG, GIF\n\
                 - Videos: MP4, AVI, MOV\n\
                 - Documents: PDF"
            }
            FailureKind::Unknown => {
                "Server Status: Unexpected Error\n\n\
                 An unexpected error occurred while processing your request.\n\n\
                 What you can do:\n\
                 - Try your request again\n\
                 - Contact technical support if the issue persists"
            }
        };
        format!("{}\n\n{}", body, EMERGENCY_REMINDER)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A classified failure from a model gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("quota or rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("file too large: {0}")]
    FileTooLarge(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Authentication(_) => FailureKind::Authentication,
            GatewayError::RateLimited(_) => FailureKind::RateLimited,
            GatewayError::Network(_) => FailureKind::Network,
            GatewayError::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
            GatewayError::MalformedResponse(_) => FailureKind::MalformedResponse,
            GatewayError::FileTooLarge(_) => FailureKind::FileTooLarge,
            GatewayError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            GatewayError::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// Human-readable explanation plus the emergency reminder
    pub fn user_guidance(&self) -> String {
        self.kind().user_guidance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [FailureKind; 8] = [
        FailureKind::Authentication,
        FailureKind::RateLimited,
        FailureKind::Network,
        FailureKind::ServiceUnavailable,
        FailureKind::MalformedResponse,
        FailureKind::FileTooLarge,
        FailureKind::UnsupportedFormat,
        FailureKind::Unknown,
    ];

    #[test]
    fn test_every_guidance_ends_with_emergency_reminder() {
        for kind in ALL_KINDS {
            assert!(
                kind.user_guidance().ends_with(EMERGENCY_REMINDER),
                "guidance for {} lacks the reminder",
                kind
            );
        }
    }

    #[test]
    fn test_guidance_is_differentiated() {
        let mut texts: Vec<String> = ALL_KINDS.iter().map(|k| k.user_guidance()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), ALL_KINDS.len());
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            GatewayError::RateLimited("429".into()).kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            serde_json::to_string(&FailureKind::ServiceUnavailable).unwrap(),
            "\"service_unavailable\""
        );
    }
}
