//! Progress Tracker for the summarization pipeline
//!
//! Shows one progress bar per document, advancing per summarized chunk.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "  {msg} [{bar:30.cyan/blue}] {pos}/{len} chunks ({elapsed})";

/// Tracks and displays progress during a batch
pub struct ProgressTracker {
    /// Total number of documents in the batch
    total_docs: usize,
    /// Number of documents finished (successfully or not)
    processed_docs: usize,
    /// Number of chunks summarized
    processed_chunks: usize,
    /// Bar for the document in flight
    bar: Option<ProgressBar>,
    /// Whether to show output (false for tests/quiet mode)
    show_output: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(total_docs: usize) -> Self {
        Self {
            total_docs,
            processed_docs: 0,
            processed_chunks: 0,
            bar: None,
            show_output: true,
        }
    }

    /// Create a quiet progress tracker (no output)
    pub fn quiet(total_docs: usize) -> Self {
        Self {
            show_output: false,
            ..Self::new(total_docs)
        }
    }

    /// Start a document with `chunks` chunks to summarize
    pub fn start_document(&mut self, name: &str, chunks: usize) {
        let bar = if self.show_output {
            let bar = ProgressBar::new(chunks as u64);
            if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(format!(
            "[{}/{}] {}",
            self.processed_docs + 1,
            self.total_docs.max(1),
            name
        ));
        self.bar = Some(bar);
    }

    /// One chunk summarized
    pub fn chunk_done(&mut self) {
        self.processed_chunks += 1;
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Finish the current document
    pub fn finish_document(&mut self) {
        self.processed_docs += 1;
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Get the number of processed documents
    pub fn docs_processed(&self) -> usize {
        self.processed_docs
    }

    /// Get the number of processed chunks
    pub fn chunks_processed(&self) -> usize {
        self.processed_chunks
    }
}
