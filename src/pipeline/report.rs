//! Batch report
//!
//! Collects one outcome per discovered document so a failing file never
//! hides the results of the others.

use crate::error::DocumentError;
use crate::llm::Usage;
use chrono::{DateTime, Local};
use colored::*;
use std::path::{Path, PathBuf};

/// Result of processing one document successfully
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    pub chunks: usize,
    pub usage: Usage,
}

/// What happened to one document
#[derive(Debug, Clone)]
pub enum OutcomeStatus {
    Succeeded {
        output: PathBuf,
        chunks: usize,
        usage: Usage,
    },
    Failed {
        kind: &'static str,
        message: String,
    },
    /// Not attempted because the batch was cancelled
    Skipped,
}

#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    pub status: OutcomeStatus,
}

/// Per-document outcomes of one batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub cancelled: bool,
    pub outcomes: Vec<DocumentOutcome>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            cancelled: false,
            outcomes: Vec::new(),
        }
    }

    pub fn record_success(&mut self, summary: DocumentSummary) {
        self.outcomes.push(DocumentOutcome {
            source: summary.source,
            status: OutcomeStatus::Succeeded {
                output: summary.output,
                chunks: summary.chunks,
                usage: summary.usage,
            },
        });
    }

    pub fn record_failure(&mut self, source: &Path, error: &DocumentError) {
        self.outcomes.push(DocumentOutcome {
            source: source.to_path_buf(),
            status: OutcomeStatus::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        });
    }

    pub fn record_skipped(&mut self, source: &Path) {
        self.outcomes.push(DocumentOutcome {
            source: source.to_path_buf(),
            status: OutcomeStatus::Skipped,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Succeeded { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Skipped))
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Token usage summed over successful documents
    pub fn total_usage(&self) -> Usage {
        let mut total = Usage::default();
        for outcome in &self.outcomes {
            if let OutcomeStatus::Succeeded { usage, .. } = &outcome.status {
                total += *usage;
            }
        }
        total
    }

    /// Print the report to stdout
    pub fn print(&self) {
        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_seconds())
            .unwrap_or_default();

        println!();
        if self.cancelled {
            println!("{}", "Batch cancelled".yellow().bold());
        } else {
            println!("{}", "Batch complete".bold());
        }

        for outcome in &self.outcomes {
            let name = display_name(&outcome.source);
            match &outcome.status {
                OutcomeStatus::Succeeded { output, chunks, .. } => println!(
                    "  {} {} -> {} ({} chunks)",
                    "✓".green(),
                    name,
                    display_name(output),
                    chunks
                ),
                OutcomeStatus::Failed { kind, message } => println!(
                    "  {} {} [{}] {}",
                    "✗".red(),
                    name,
                    kind.red(),
                    message
                ),
                OutcomeStatus::Skipped => println!("  {} {} (skipped)", "-".dimmed(), name),
            }
        }

        let usage = self.total_usage();
        println!();
        println!(
            "  Succeeded: {}  Failed: {}  Skipped: {}  Tokens: {}  Time: {}s",
            self.succeeded().count().to_string().green(),
            self.failed().count().to_string().red(),
            self.skipped().count(),
            usage.total_tokens,
            elapsed
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    fn success(name: &str, tokens: usize) -> DocumentSummary {
        DocumentSummary {
            source: PathBuf::from(format!("{}.pdf", name)),
            output: PathBuf::from(format!("{}_summary.txt", name)),
            chunks: 1,
            usage: Usage {
                prompt_tokens: tokens,
                completion_tokens: 0,
                total_tokens: tokens,
            },
        }
    }

    #[test]
    fn test_counts() {
        let mut report = BatchReport::new();
        report.record_success(success("a", 10));
        report.record_failure(
            Path::new("b.pdf"),
            &DocumentError::from(ExtractionError::NoText(PathBuf::from("b.pdf"))),
        );
        report.record_skipped(Path::new("c.pdf"));
        report.finish();

        assert_eq!(report.succeeded().count(), 1);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.skipped().count(), 1);
        assert!(report.has_failures());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_failure_carries_kind() {
        let mut report = BatchReport::new();
        report.record_failure(Path::new("x.pdf"), &DocumentError::Cancelled);

        match &report.outcomes[0].status {
            OutcomeStatus::Failed { kind, message } => {
                assert_eq!(*kind, "cancelled");
                assert_eq!(message, "cancelled");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_usage_only_from_successes() {
        let mut report = BatchReport::new();
        report.record_success(success("a", 10));
        report.record_success(success("b", 5));
        report.record_skipped(Path::new("c.pdf"));

        assert_eq!(report.total_usage().total_tokens, 15);
        assert!(!report.has_failures());
    }
}
