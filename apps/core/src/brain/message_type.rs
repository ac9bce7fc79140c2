//! Closed set of routing labels and attachment categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing label assigned to an inbound chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Greeting, small talk or any text that matched no other rule
    GreetingOrGeneral,
    /// Asking for news/updates about a disaster
    DisasterInformationRequest,
    ImageAnalysis,
    VideoAnalysis,
    PdfAnalysis,
    /// Anxiety, fear or other distress
    PsychologicalSupport,
    /// The user reports being in danger right now
    EmergencyProtocol,
}

impl MessageType {
    pub const ALL: [MessageType; 7] = [
        MessageType::GreetingOrGeneral,
        MessageType::DisasterInformationRequest,
        MessageType::ImageAnalysis,
        MessageType::VideoAnalysis,
        MessageType::PdfAnalysis,
        MessageType::PsychologicalSupport,
        MessageType::EmergencyProtocol,
    ];

    /// Returns the wire label for the message type
    pub fn label(&self) -> &'static str {
        match self {
            MessageType::GreetingOrGeneral => "greeting_or_general",
            MessageType::DisasterInformationRequest => "disaster_information_request",
            MessageType::ImageAnalysis => "image_analysis",
            MessageType::VideoAnalysis => "video_analysis",
            MessageType::PdfAnalysis => "pdf_analysis",
            MessageType::PsychologicalSupport => "psychological_support",
            MessageType::EmergencyProtocol => "emergency_protocol",
        }
    }

    /// Parse a wire label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Attachment category that can influence classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeCategory {
    Image,
    Video,
    Pdf,
}

impl MimeCategory {
    /// Map a MIME type (`image/png`, `video/mp4`, `application/pdf`) to a category.
    /// Anything else has no influence on classification.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(MimeCategory::Image)
        } else if mime.starts_with("video/") {
            Some(MimeCategory::Video)
        } else if mime == "application/pdf" {
            Some(MimeCategory::Pdf)
        } else {
            None
        }
    }

    /// Map a bare category name (`image`, `video`, `pdf`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MimeCategory::Image),
            "video" => Some(MimeCategory::Video),
            "pdf" => Some(MimeCategory::Pdf),
            _ => None,
        }
    }
}
