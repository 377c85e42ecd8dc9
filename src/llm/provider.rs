//! The Provider Abstraction.
//!
//! This trait defines the standard interface for any chat-completion
//! backend. The summarizer only talks to this trait.

use super::types::{CompletionResponse, Message, SamplingConfig};
use crate::error::CompletionError;
use async_trait::async_trait;

/// The core trait for LLM interactions.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Send a chat completion request and return the top choice.
    async fn completion(
        &self,
        messages: &[Message],
        sampling: &SamplingConfig,
    ) -> Result<CompletionResponse, CompletionError>;
}
