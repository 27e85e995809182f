//! Seam for turning an uploaded document into plain text.
//!
//! Real PDF extraction lives outside this workspace; anything that can hand
//! back the document's text can plug in here.

use crate::error::ExtractError;

/// Converts raw document bytes into the text the question parser reads.
pub trait TextExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExtractError` if the document cannot be read as text.
    fn extract(&self, document: &[u8]) -> Result<String, ExtractError>;
}

/// Accepts documents whose text was already extracted (UTF-8 bytes).
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8TextExtractor;

impl TextExtractor for Utf8TextExtractor {
    fn extract(&self, document: &[u8]) -> Result<String, ExtractError> {
        if document.is_empty() {
            return Err(ExtractError::Empty);
        }
        let text = String::from_utf8(document.to_vec())?;
        // Extractors often emit CRLF and form feeds between pages.
        Ok(text.replace("\r\n", "\n").replace('\u{c}', "\n"))
    }
}
