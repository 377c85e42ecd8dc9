//! PDF text extraction
//!
//! Reads the text layer page by page with `pdf_oxide`.

use super::TextExtractor;
use crate::error::ExtractionError;
use pdf_oxide::document::PdfDocument;
use std::path::Path;

/// Extracts the text layer of PDF files
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        tracing::info!(path = %path.display(), "Extracting text");

        // Surface I/O problems separately from parse failures
        std::fs::metadata(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut doc = PdfDocument::open(path).map_err(|e| ExtractionError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let page_count = doc.page_count().map_err(|e| ExtractionError::PageCount {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if page_count == 0 {
            return Err(ExtractionError::Open {
                path: path.to_path_buf(),
                message: "document has no pages".to_string(),
            });
        }

        let mut pages = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            tracing::debug!(page = page_index + 1, total = page_count, "Extracting page");

            let text = doc
                .extract_text(page_index)
                .map_err(|e| ExtractionError::Page {
                    path: path.to_path_buf(),
                    page: page_index + 1,
                    message: e.to_string(),
                })?;
            pages.push(text);
        }

        tracing::info!(
            path = %path.display(),
            pages = page_count,
            chars = pages.iter().map(|p| p.len()).sum::<usize>(),
            "Finished extracting text"
        );

        Ok(pages)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
