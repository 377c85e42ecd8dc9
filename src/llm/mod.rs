//! LLM Layer
//!
//! This module handles all interactions with chat-completion services:
//! - Provider abstraction and the OpenAI-compatible implementation
//! - Prompt templates
//! - Retry with backoff for transient failures

pub mod openai;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod types;

// Re-export key types
pub use openai::OpenAIProvider;
pub use prompt::{PromptStyle, PromptTemplate};
pub use provider::LLMProvider;
pub use retry::RetryPolicy;
pub use types::{CompletionResponse, Message, Role, SamplingConfig, Usage};
