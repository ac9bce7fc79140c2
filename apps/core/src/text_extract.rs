//! Text extraction for PDF attachments.
//!
//! Extraction is best-effort: any failure yields [`PDF_EXTRACTION_PLACEHOLDER`]
//! so the request still reaches the model.

use tracing::{info, warn};

/// Substituted when a PDF cannot be read
pub const PDF_EXTRACTION_PLACEHOLDER: &str = "Error extracting PDF content";

/// Extract text from PDF bytes, or an error description
pub fn try_extract_pdf_text(file_data: &[u8]) -> Result<String, String> {
    info!("Extracting text from PDF ({} bytes)...", file_data.len());

    // pdf-extract panics on some malformed inputs
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(file_data));

    match outcome {
        Ok(Ok(text)) => {
            let cleaned = clean_extracted_text(&text);
            info!("PDF extraction successful: {} characters", cleaned.len());
            Ok(cleaned)
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {}", e);
            Err(format!("Failed to extract PDF text: {}", e))
        }
        Err(_) => {
            warn!("PDF extraction aborted on malformed input");
            Err("PDF parser aborted on malformed input".to_string())
        }
    }
}

/// Extract text from PDF bytes, degrading to the placeholder on failure
pub fn extract_pdf_text(file_data: &[u8]) -> String {
    try_extract_pdf_text(file_data).unwrap_or_else(|_| PDF_EXTRACTION_PLACEHOLDER.to_string())
}

/// Clean up extracted text
fn clean_extracted_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
