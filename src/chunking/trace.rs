//! Chunk trace file
//!
//! Debug aid: records every chunk sent for summarization. The file is
//! truncated when a new document starts, so it always holds the chunks of
//! the most recent document.

use super::Chunk;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const SEPARATOR_WIDTH: usize = 40;

/// Appends chunk contents to a trace file
#[derive(Debug, Clone)]
pub struct ChunkTrace {
    path: PathBuf,
}

impl ChunkTrace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the trace for a new document
    pub fn reset(&self) {
        if let Err(e) = std::fs::write(&self.path, "") {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to reset chunk trace");
        }
    }

    /// Append one chunk entry
    pub fn record(&self, chunk: &Chunk) {
        let entry = format!(
            "Chunk {}:\n{}\n{}\n",
            chunk.index + 1,
            chunk.content,
            "-".repeat(SEPARATOR_WIDTH)
        );

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to append to chunk trace");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, content: &str) -> Chunk {
        Chunk {
            index,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_record_format() {
        let dir = tempfile::tempdir().unwrap();
        let trace = ChunkTrace::new(dir.path().join("chunks_log.txt"));

        trace.reset();
        trace.record(&chunk(0, "first"));
        trace.record(&chunk(1, "second"));

        let content = std::fs::read_to_string(trace.path()).unwrap();
        let dashes = "-".repeat(40);
        assert_eq!(
            content,
            format!("Chunk 1:\nfirst\n{dashes}\nChunk 2:\nsecond\n{dashes}\n")
        );
    }

    #[test]
    fn test_reset_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let trace = ChunkTrace::new(dir.path().join("chunks_log.txt"));

        trace.record(&chunk(0, "old document"));
        trace.reset();
        trace.record(&chunk(0, "new document"));

        let content = std::fs::read_to_string(trace.path()).unwrap();
        assert!(!content.contains("old document"));
        assert!(content.contains("new document"));
    }

    #[test]
    fn test_unwritable_trace_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let trace = ChunkTrace::new(dir.path().join("missing").join("chunks_log.txt"));

        trace.reset();
        trace.record(&chunk(0, "ignored"));
        assert!(!trace.path().exists());
    }
}
