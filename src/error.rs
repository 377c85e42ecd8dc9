//! Error taxonomy for Precis
//!
//! Run-level errors (configuration, arguments) abort before any document is
//! touched. Document-level errors are captured per file by the pipeline and
//! end up in the batch report.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems, detected before processing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("input directory {path:?} {reason}")]
    InputDirectory { path: PathBuf, reason: &'static str },

    #[error("input file {path:?} {reason}")]
    InputFile { path: PathBuf, reason: &'static str },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine home directory")]
    NoHomeDir,
}

/// A caller-supplied value is out of range.
#[derive(Debug, Error)]
#[error("invalid argument: {0}")]
pub struct InvalidArgument(pub String);

/// Text could not be extracted from a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid PDF {path:?}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("cannot read page count of {path:?}: {message}")]
    PageCount { path: PathBuf, message: String },

    #[error("no text layer could be decoded on page {page} of {path:?}: {message}")]
    Page {
        path: PathBuf,
        page: usize,
        message: String,
    },

    #[error("document {0:?} contains no extractable text")]
    NoText(PathBuf),

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// A summarization call failed.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("API error: {status} {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("refusing to summarize an empty chunk")]
    EmptyInput,

    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<CompletionError>,
    },
}

impl CompletionError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::EmptyInput | Self::Exhausted { .. } => false,
        }
    }
}

/// The summary file could not be written.
#[derive(Debug, Error)]
#[error("failed to write {path:?}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Failure of a single document. Never aborts the batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("chunk {chunk}: {source}")]
    Completion {
        chunk: usize,
        #[source]
        source: CompletionError,
    },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("cancelled")]
    Cancelled,
}

impl DocumentError {
    /// Stable label used in the batch report.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extraction",
            Self::Completion { .. } => "completion",
            Self::Write(_) => "write",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Fatal run-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    #[error("failed to list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
