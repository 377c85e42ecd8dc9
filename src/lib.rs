//! Precis - batch PDF summarization
//!
//! Extracts the text of every PDF in a directory, splits it into bounded
//! chunks, asks a chat-completion model for a summary of each chunk, and
//! writes the ordered summaries next to the source file.

pub mod chunking;
pub mod config;
pub mod error;
pub mod extract;
pub mod init;
pub mod llm;
pub mod pipeline;
pub mod summarize;

pub use chunking::{Chunk, ChunkTrace, ChunkUnit, Chunker};
pub use config::Config;
pub use error::{
    CompletionError, ConfigError, DocumentError, Error, ExtractionError, InvalidArgument,
    WriteError,
};
pub use extract::{PdfExtractor, TextExtractor};
pub use init::{run_init, InitResult};
pub use llm::{LLMProvider, OpenAIProvider, PromptStyle, PromptTemplate, RetryPolicy, SamplingConfig};
pub use pipeline::{discover_pdfs, BatchReport, DocumentSummary, Pipeline, SummaryWriter};
pub use summarize::{Summarizer, Summary};
