//! Text extraction
//!
//! Turns a document on disk into plain text, one string per page. The
//! pipeline depends only on the [`TextExtractor`] trait; [`PdfExtractor`]
//! is the production implementation.

mod pdf;

pub use pdf::PdfExtractor;

use crate::error::ExtractionError;
use std::path::Path;

/// Separator placed between consecutive pages
pub const PAGE_SEPARATOR: &str = "\n";

/// Source of per-page document text
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, in document order.
    ///
    /// A page whose text cannot be decoded is an error for the whole
    /// document; a page that decodes to nothing is an empty string.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;

    /// Extract the full document text, pages joined by [`PAGE_SEPARATOR`].
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        Ok(self.extract_pages(path)?.join(PAGE_SEPARATOR))
    }

    /// File extensions this extractor handles (lowercase, no dot)
    fn supported_extensions(&self) -> &[&str];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct TwoPages;

    impl TextExtractor for TwoPages {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, ExtractionError> {
            Ok(vec!["page one".to_string(), "page two".to_string()])
        }

        fn supported_extensions(&self) -> &[&str] {
            &["pdf"]
        }
    }

    struct BrokenPage;

    impl TextExtractor for BrokenPage {
        fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
            Err(ExtractionError::Page {
                path: path.to_path_buf(),
                page: 2,
                message: "no text layer".to_string(),
            })
        }

        fn supported_extensions(&self) -> &[&str] {
            &["pdf"]
        }
    }

    #[test]
    fn test_pages_joined_with_newline() {
        let text = TwoPages.extract(&PathBuf::from("doc.pdf")).unwrap();
        assert_eq!(text, "page one\npage two");
    }

    #[test]
    fn test_page_failure_fails_document() {
        let err = BrokenPage.extract(&PathBuf::from("doc.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::Page { page: 2, .. }));
    }
}
