//! Text layer extraction from PDF bytes.

use lopdf::Document;
use tracing::debug;

use crate::error::ExtractionError;

/// Decode every page's text layer in page order, join pages with a newline and
/// trim the result.
///
/// Pages without a decodable text layer contribute an empty string. A document
/// that yields no text at all is an error, since nothing downstream can work
/// with it.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        Document::load_mem(pdf_bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(ExtractionError::NoPages);
    }

    let page_texts: Vec<String> = pages
        .keys()
        .map(|&number| match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page = number, error = %e, "page has no decodable text layer");
                String::new()
            }
        })
        .collect();

    let text = page_texts.join("\n").trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::NoText { pages: pages.len() });
    }

    debug!(pages = pages.len(), chars = text.len(), "extracted PDF text");
    Ok(text)
}
