//! PDF text extraction for uploaded resumes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The uploaded bytes are not a readable PDF.
    #[error("not a readable PDF document: {0}")]
    InvalidDocument(String),
}

/// Extracts plain text from an uploaded resume, page by page.
///
/// Pages that yield no text (scanned images) are skipped. Remaining page
/// texts are joined in page order with a single newline. A document with
/// zero extractable pages yields an empty string, which is not an error.
pub fn extract_resume_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::InvalidDocument(e.to_string()))?;
    Ok(join_pages(pages))
}

fn join_pages(pages: Vec<String>) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_preserves_page_order() {
        let joined = join_pages(vec!["Hello".to_string(), "World".to_string()]);
        assert_eq!(joined, "Hello\nWorld");
    }

    #[test]
    fn test_join_pages_skips_pages_without_text() {
        let joined = join_pages(vec![
            "Hello".to_string(),
            "   \n".to_string(),
            String::new(),
        ]);
        assert_eq!(joined, "Hello");
    }

    #[test]
    fn test_join_pages_empty_document_yields_empty_string() {
        assert_eq!(join_pages(vec![]), "");
    }

    #[test]
    fn test_garbage_bytes_are_not_a_document() {
        let err = extract_resume_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidDocument(_)));
    }
}
