//! Request and response types for the chat service.
//!
//! Attachments carry raw bytes in memory and base64 on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use validator::{Validate, ValidationError};

use crate::brain::{MessageType, MimeCategory};
use crate::gateway::FailureKind;

/// Represents an inbound chat request, validated before classification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    /// The user's free-text message. Must contain non-whitespace characters.
    #[validate(custom(function = "validate_not_blank"))]
    pub message: String,
    /// Uploaded files. Only the first one is forwarded to the model.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Optional conversation context supplied by the client.
    #[serde(default)]
    #[validate(nested)]
    pub context: Option<ConversationContext>,
    /// Free-form response-style hints, rendered one line per pair.
    #[serde(default)]
    #[validate(custom(function = "validate_preference_keys"))]
    pub preferences: BTreeMap<String, String>,
}

impl ChatRequest {
    /// Creates a text-only request.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attachments: vec![],
            context: None,
            preferences: BTreeMap::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_context(mut self, context: ConversationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_preference(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.preferences.insert(key.into(), value.into());
        self
    }

    /// Attachment categories that can influence classification
    pub fn mime_categories(&self) -> HashSet<MimeCategory> {
        self.attachments
            .iter()
            .filter_map(|a| MimeCategory::from_mime(&a.mime_type))
            .collect()
    }

    /// Session id from the context, or `"unknown"`
    pub fn session_id(&self) -> &str {
        self.context
            .as_ref()
            .map(|c| c.session_id.as_str())
            .unwrap_or(DEFAULT_SESSION_ID)
    }

    /// Input method from the context, or `"text"`
    pub fn input_method(&self) -> &str {
        self.context
            .as_ref()
            .map(|c| c.input_method.as_str())
            .unwrap_or(DEFAULT_INPUT_METHOD)
    }
}

fn validate_not_blank(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Message is required".into());
        return Err(err);
    }
    Ok(())
}

fn validate_preference_keys(preferences: &BTreeMap<String, String>) -> Result<(), ValidationError> {
    if preferences.keys().any(|k| k.trim().is_empty()) {
        let mut err = ValidationError::new("blank_key");
        err.message = Some("Preference keys must not be empty".into());
        return Err(err);
    }
    Ok(())
}

const DEFAULT_SESSION_ID: &str = "unknown";
const DEFAULT_INPUT_METHOD: &str = "text";

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

fn default_input_method() -> String {
    DEFAULT_INPUT_METHOD.to_string()
}

fn default_chat_title() -> String {
    "New Chat".to_string()
}

/// Client-supplied conversation context. Missing fields take their defaults
/// at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    /// How the message was entered (e.g., "text", "voice").
    #[serde(default = "default_input_method")]
    #[validate(length(min = 1, max = 32))]
    pub input_method: String,
    #[serde(default = "default_session_id")]
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[serde(default, rename = "previousContext")]
    pub previous: Option<PreviousContext>,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            input_method: default_input_method(),
            session_id: default_session_id(),
            previous: None,
        }
    }
}

impl ConversationContext {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }
}

/// Summary of earlier turns in the same chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousContext {
    #[serde(default)]
    pub message_count: u32,
    #[serde(default = "default_chat_title")]
    pub chat_title: String,
    #[serde(default)]
    pub recent_messages: Option<String>,
}

impl Default for PreviousContext {
    fn default() -> Self {
        Self {
            message_count: 0,
            chat_title: default_chat_title(),
            recent_messages: None,
        }
    }
}

/// An uploaded file. `data` travels as base64 in JSON.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    /// Declared MIME type; may be empty, in which case it is sniffed.
    #[serde(default)]
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn category(&self) -> Option<MimeCategory> {
        MimeCategory::from_mime(&self.mime_type)
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Normalized result returned to the caller for every chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// False when the model gateway failed; `response` then holds guidance.
    pub success: bool,
    pub response: String,
    pub message_type: MessageType,
    pub input_method: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub has_files: bool,
    /// Whether the client supplied earlier-turn context.
    pub context_used: bool,
    /// Category of the gateway failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}
