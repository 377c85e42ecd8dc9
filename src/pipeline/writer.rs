//! Summary file writer
//!
//! Renders the ordered summaries of one document and writes them next to the
//! source PDF. The file is first written under a `.partial` name and then
//! renamed, so an interrupted or failed write never leaves a truncated
//! summary behind.

use crate::error::WriteError;
use crate::summarize::Summary;
use std::path::{Path, PathBuf};

const PARTIAL_EXTENSION: &str = "partial";

/// Writes `<stem><suffix>` files beside their source documents
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    suffix: String,
    numbered: bool,
}

impl SummaryWriter {
    pub fn new(suffix: impl Into<String>, numbered: bool) -> Self {
        Self {
            suffix: suffix.into(),
            numbered,
        }
    }

    /// Where the summary of `source` is written
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = format!("{}{}", stem, self.suffix);

        match source.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Blocks in index order, separated by a blank line
    pub fn render(&self, summaries: &[Summary]) -> String {
        let mut ordered: Vec<&Summary> = summaries.iter().collect();
        ordered.sort_by_key(|s| s.index);

        let blocks: Vec<String> = ordered
            .iter()
            .enumerate()
            .map(|(i, summary)| {
                if self.numbered {
                    format!("Summary {}:\n{}", i + 1, summary.content)
                } else {
                    summary.content.clone()
                }
            })
            .collect();

        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }

    /// Render and write the summary file for `source`
    pub fn write(&self, source: &Path, summaries: &[Summary]) -> Result<PathBuf, WriteError> {
        let output = self.output_path(source);
        let partial = partial_path(&output);
        let content = self.render(summaries);

        if let Err(source) = std::fs::write(&partial, content) {
            discard(&partial);
            return Err(WriteError {
                path: partial,
                source,
            });
        }

        if let Err(source) = std::fs::rename(&partial, &output) {
            discard(&partial);
            return Err(WriteError {
                path: output,
                source,
            });
        }

        tracing::info!(path = %output.display(), blocks = summaries.len(), "Summary written");
        Ok(output)
    }
}

fn discard(partial: &Path) {
    if partial.is_file() {
        if let Err(e) = std::fs::remove_file(partial) {
            tracing::warn!(path = %partial.display(), error = %e, "Failed to remove partial summary");
        }
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_EXTENSION);
    output.with_file_name(name)
}
