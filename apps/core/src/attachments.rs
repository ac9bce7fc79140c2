//! Attachment intake: size and format checks before the gateway is called,
//! plus MIME resolution for uploads that arrive without a usable type.

use std::path::Path;
use tracing::{debug, warn};

use crate::brain::MimeCategory;
use crate::error::AppError;
use crate::gateway::FailureKind;
use crate::models::Attachment;

/// 10 MB
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "mp4", "avi", "mov", "pdf"];

/// Upload limits applied to every attachment
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    pub max_bytes: usize,
    pub allowed_extensions: &'static [&'static str],
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::with_max_bytes(DEFAULT_MAX_ATTACHMENT_BYTES)
    }
}

impl AttachmentPolicy {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            allowed_extensions: ALLOWED_EXTENSIONS,
        }
    }

    /// Reject oversized files and unsupported extensions.
    pub fn check(&self, attachment: &Attachment) -> Result<(), AppError> {
        if attachment.data.len() > self.max_bytes {
            warn!(
                file = %attachment.file_name,
                bytes = attachment.data.len(),
                limit = self.max_bytes,
                "Attachment exceeds size limit"
            );
            return Err(AppError::Attachment {
                kind: FailureKind::FileTooLarge,
                reason: format!(
                    "{} is {} bytes, the limit is {} bytes",
                    attachment.file_name,
                    attachment.data.len(),
                    self.max_bytes
                ),
            });
        }

        let extension = extension_of(&attachment.file_name);
        if !self.allowed_extensions.contains(&extension.as_str()) {
            warn!(file = %attachment.file_name, "Attachment extension not allowed");
            return Err(AppError::Attachment {
                kind: FailureKind::UnsupportedFormat,
                reason: format!("Unsupported file extension: '{}'", extension),
            });
        }

        Ok(())
    }

    /// Check an attachment and fill in its MIME type when missing. The
    /// resolved type must be an image, a video or a PDF.
    pub fn admit(&self, mut attachment: Attachment) -> Result<Attachment, AppError> {
        self.check(&attachment)?;
        attachment.mime_type = resolve_mime_type(&attachment);

        if MimeCategory::from_mime(&attachment.mime_type).is_none() {
            warn!(
                file = %attachment.file_name,
                mime = %attachment.mime_type,
                "Attachment content type not accepted"
            );
            return Err(AppError::Attachment {
                kind: FailureKind::UnsupportedFormat,
                reason: format!(
                    "Unsupported content type '{}' for {}",
                    attachment.mime_type, attachment.file_name
                ),
            });
        }

        Ok(attachment)
    }
}

/// Declared type if usable, else sniffed from content, else guessed from the extension
pub fn resolve_mime_type(attachment: &Attachment) -> String {
    let declared = attachment.mime_type.trim();
    if !declared.is_empty() && declared != "application/octet-stream" {
        return declared.to_ascii_lowercase();
    }

    if let Some(kind) = infer::get(&attachment.data) {
        debug!(file = %attachment.file_name, mime = kind.mime_type(), "MIME type sniffed from content");
        return kind.mime_type().to_string();
    }

    mime_from_extension(&extension_of(&attachment.file_name))
        .unwrap_or("application/octet-stream")
        .to_string()
}

fn mime_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "mp4" => Some("video/mp4"),
        "avi" => Some("video/x-msvideo"),
        "mov" => Some("video/quicktime"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_oversized_file_rejected() {
        let policy = AttachmentPolicy::with_max_bytes(4);
        let attachment = Attachment::new("flood.png", "image/png", vec![0; 5]);
        let err = policy.check(&attachment).unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::FileTooLarge));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let policy = AttachmentPolicy::default();
        let attachment = Attachment::new("plan.docx", "", vec![1, 2, 3]);
        let err = policy.check(&attachment).unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::UnsupportedFormat));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let policy = AttachmentPolicy::default();
        let attachment = Attachment::new("SCENE.JPG", "image/jpeg", vec![1]);
        assert!(policy.check(&attachment).is_ok());
    }

    #[test]
    fn test_admit_fills_missing_mime() {
        let policy = AttachmentPolicy::default();
        let admitted = policy
            .admit(Attachment::new("clip.mov", "", vec![0, 1, 2]))
            .unwrap();
        assert_eq!(admitted.mime_type, "video/quicktime");
    }

    #[test]
    fn test_admit_rejects_type_outside_accepted_categories() {
        let policy = AttachmentPolicy::default();
        let attachment = Attachment::new("scene.png", "text/plain", PNG_MAGIC.to_vec());
        let err = policy.admit(attachment).unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::UnsupportedFormat));
    }

    #[test]
    fn test_declared_mime_wins() {
        let attachment = Attachment::new("a.png", "Image/PNG", PNG_MAGIC.to_vec());
        assert_eq!(resolve_mime_type(&attachment), "image/png");
    }

    #[test]
    fn test_mime_sniffed_from_content() {
        let attachment = Attachment::new("upload.jpg", "application/octet-stream", PNG_MAGIC.to_vec());
        assert_eq!(resolve_mime_type(&attachment), "image/png");
    }

    #[test]
    fn test_mime_guessed_from_extension() {
        let attachment = Attachment::new("clip.mov", "", vec![0, 1, 2]);
        assert_eq!(resolve_mime_type(&attachment), "video/quicktime");
    }
}
