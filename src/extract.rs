//! PDF text extraction.
//!
//! The pipeline only needs "bytes in, text plus page count out", expressed
//! by [`TextExtractor`]. [`PdfExtractor`] is the shipped implementation:
//! `lopdf` counts pages, `pdf-extract` produces the text.

use std::path::Path;

use crate::error::{DocragError, Result};

/// Page separator in `pdf-extract` output.
const FORM_FEED: char = '\x0C';

/// Text and page count pulled out of one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Turns a source document into plain text.
pub trait TextExtractor {
    /// `path` is used for diagnostics only; content comes from `bytes`.
    fn extract(&self, path: &Path, bytes: &[u8]) -> Result<ExtractedText>;
}

/// Extracts text from PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path, bytes: &[u8]) -> Result<ExtractedText> {
        let document = lopdf::Document::load_mem(bytes).map_err(|e| DocragError::Extract {
            path: path.to_path_buf(),
            message: format!("cannot parse PDF: {}", e),
        })?;
        let page_count = document.get_pages().len();

        // pdf-extract panics on some malformed fonts and encodings that lopdf
        // accepts; a panic must fail this document only.
        let raw = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|payload| DocragError::Extract {
                path: path.to_path_buf(),
                message: format!("text extraction panicked: {}", panic_message(&*payload)),
            })?
            .map_err(|e| DocragError::Extract {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(ExtractedText {
            text: join_pages(&raw),
            page_count,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Terminate every page with a blank line so page breaks also break
/// paragraphs for the markdown pass.
fn join_pages(raw: &str) -> String {
    let mut pages: Vec<&str> = raw.split(FORM_FEED).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }

    let mut text = String::with_capacity(raw.len() + pages.len() * 2);
    for page in pages {
        text.push_str(page);
        text.push_str("\n\n");
    }
    text
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pdf_extracts_text_and_pages() {
        let extracted = PdfExtractor
            .extract(Path::new("ok.pdf"), &fixtures::pdf_with_phrase("hello pages"))
            .unwrap();
        assert_eq!(extracted.page_count, 1);
        assert!(extracted.text.contains("hello"));
    }

    #[test]
    fn extractor_panic_becomes_error() {
        let bytes = fixtures::pdf_with_undefined_font();
        assert!(lopdf::Document::load_mem(&bytes).is_ok());

        let err = PdfExtractor
            .extract(Path::new("nofont.pdf"), &bytes)
            .unwrap_err();
        assert!(matches!(err, DocragError::Extract { .. }));
        assert!(err.to_string().contains("nofont.pdf"));
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = PdfExtractor
            .extract(Path::new("broken.pdf"), b"not a pdf")
            .unwrap_err();
        assert!(matches!(err, DocragError::Extract { .. }));
        assert!(err.to_string().contains("broken.pdf"));
    }

    #[test]
    fn pages_end_with_blank_line() {
        assert_eq!(join_pages("one\x0Ctwo\x0C"), "one\n\ntwo\n\n");
        assert_eq!(join_pages("single"), "single\n\n");
    }
}
