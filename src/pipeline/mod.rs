//! Summarization pipeline
//!
//! Drives one document through Extract -> Chunk -> Summarize -> Write, and a
//! directory of documents through that flow one at a time. A failing
//! document is recorded in the [`BatchReport`] and the batch moves on.
//!
//! Cancellation is cooperative: the token is checked before every document
//! and every chunk, and raced against the in-flight completion call. A
//! cancelled document writes nothing.

mod progress;
mod report;
mod writer;

pub use progress::ProgressTracker;
pub use report::{BatchReport, DocumentOutcome, DocumentSummary, OutcomeStatus};
pub use writer::SummaryWriter;

use crate::chunking::{Chunk, ChunkTrace, Chunker};
use crate::config::Config;
use crate::error::{ConfigError, DocumentError, Error, ExtractionError, InvalidArgument};
use crate::extract::{PdfExtractor, TextExtractor};
use crate::llm::{LLMProvider, Usage};
use crate::summarize::{Summarizer, Summary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

/// Extract, chunk, summarize, and write documents
pub struct Pipeline {
    extractor: Arc<dyn TextExtractor>,
    chunker: Chunker,
    summarizer: Summarizer,
    writer: SummaryWriter,
    trace: Option<ChunkTrace>,
    cancel: CancellationToken,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        chunker: Chunker,
        summarizer: Summarizer,
        writer: SummaryWriter,
    ) -> Self {
        Self {
            extractor,
            chunker,
            summarizer,
            writer,
            trace: None,
            cancel: CancellationToken::new(),
            show_progress: true,
        }
    }

    /// Build the PDF pipeline described by `config` around `provider`
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn LLMProvider>,
    ) -> Result<Self, InvalidArgument> {
        config.validate()?;

        let summarizer = Summarizer::new(
            provider,
            config.prompt_template(),
            config.sampling(),
            config.retry_policy(),
        );
        let writer = SummaryWriter::new(config.output.suffix.clone(), config.output.numbered);

        let mut pipeline = Self::new(Arc::new(PdfExtractor::new()), config.chunker()?, summarizer, writer);
        if let Some(ref path) = config.output.trace_file {
            pipeline = pipeline.with_trace(ChunkTrace::new(path.clone()));
        }
        Ok(pipeline)
    }

    /// Record every chunk in a trace file
    pub fn with_trace(mut self, trace: ChunkTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Stop between chunks and documents once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Hide progress bars
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Summarize a single document
    pub async fn process_document(&self, path: &Path) -> Result<DocumentSummary, DocumentError> {
        let mut progress = self.tracker(1);
        let result = self.run_document(path, &mut progress).await;
        progress.finish_document();
        result
    }

    /// Summarize every supported document directly inside `dir`
    pub async fn process_directory(&self, dir: &Path) -> Result<BatchReport, Error> {
        let documents = discover_documents(dir, self.extractor.supported_extensions())?;
        tracing::info!(dir = %dir.display(), documents = documents.len(), "Processing directory");

        let mut report = BatchReport::new();
        let mut progress = self.tracker(documents.len());

        for path in &documents {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                report.record_skipped(path);
                continue;
            }

            let result = self.run_document(path, &mut progress).await;
            progress.finish_document();

            match result {
                Ok(summary) => report.record_success(summary),
                Err(e) => {
                    if matches!(e, DocumentError::Cancelled) {
                        report.cancelled = true;
                    }
                    tracing::error!(
                        path = %path.display(),
                        kind = e.kind(),
                        error = %e,
                        "Document failed"
                    );
                    report.record_failure(path, &e);
                }
            }
        }

        report.finish();
        Ok(report)
    }

    fn tracker(&self, total_docs: usize) -> ProgressTracker {
        if self.show_progress {
            ProgressTracker::new(total_docs)
        } else {
            ProgressTracker::quiet(total_docs)
        }
    }

    async fn extract(&self, path: &Path) -> Result<String, DocumentError> {
        let extractor = Arc::clone(&self.extractor);
        let source = path.to_path_buf();

        let text = tokio::task::spawn_blocking(move || extractor.extract(&source))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;

        if text.trim().is_empty() {
            return Err(ExtractionError::NoText(path.to_path_buf()).into());
        }
        Ok(text)
    }

    async fn run_document(
        &self,
        path: &Path,
        progress: &mut ProgressTracker,
    ) -> Result<DocumentSummary, DocumentError> {
        if self.cancel.is_cancelled() {
            return Err(DocumentError::Cancelled);
        }

        tracing::info!(path = %path.display(), "Processing file");
        let text = self.extract(path).await?;

        let chunks = self.chunker.chunk(&text);
        tracing::info!(
            chunks = chunks.len(),
            size = self.chunker.size(),
            unit = self.chunker.unit().name(),
            "Split text into chunks"
        );

        if let Some(ref trace) = self.trace {
            trace.reset();
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        progress.start_document(&name, chunks.len());

        let (summaries, usage) = self.summarize_chunks(&chunks, progress).await?;
        let output = self.writer.write(path, &summaries)?;

        Ok(DocumentSummary {
            source: path.to_path_buf(),
            output,
            chunks: chunks.len(),
            usage,
        })
    }

    async fn summarize_chunks(
        &self,
        chunks: &[Chunk],
        progress: &mut ProgressTracker,
    ) -> Result<(Vec<Summary>, Usage), DocumentError> {
        let mut summaries = Vec::with_capacity(chunks.len());
        let mut usage = Usage::default();

        for chunk in chunks {
            if self.cancel.is_cancelled() {
                return Err(DocumentError::Cancelled);
            }

            if let Some(ref trace) = self.trace {
                trace.record(chunk);
            }

            tracing::info!(chunk = chunk.index + 1, total = chunks.len(), "Summarizing chunk");

            let summary = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(DocumentError::Cancelled),
                result = self.summarizer.summarize(chunk) => {
                    result.map_err(|source| DocumentError::Completion {
                        chunk: chunk.index + 1,
                        source,
                    })?
                }
            };

            usage += summary.usage;
            progress.chunk_done();
            summaries.push(summary);
        }

        Ok((summaries, usage))
    }
}

/// PDFs directly inside `dir`, sorted by file name
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    discover_documents(dir, &["pdf"])
}

/// Regular files directly inside `dir` whose extension is in `extensions`
/// (ASCII case-insensitive), sorted by file name. Subdirectories are not
/// entered.
pub fn discover_documents(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, Error> {
    if !dir.exists() {
        return Err(ConfigError::InputDirectory {
            path: dir.to_path_buf(),
            reason: "does not exist",
        }
        .into());
    }
    if !dir.is_dir() {
        return Err(ConfigError::InputDirectory {
            path: dir.to_path_buf(),
            reason: "is not a directory",
        }
        .into());
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
            .unwrap_or(false);

        if matches && path.is_file() {
            documents.push(path.to_path_buf());
        }
    }

    documents.sort();
    Ok(documents)
}
