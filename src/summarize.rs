//! Chunk summarization
//!
//! Binds a provider to a prompt template, sampling parameters, and a retry
//! policy. One chunk in, one summary out.

use crate::chunking::Chunk;
use crate::error::CompletionError;
use crate::llm::{LLMProvider, PromptTemplate, RetryPolicy, SamplingConfig, Usage};
use std::sync::Arc;

/// The model's summary of one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Index of the source chunk
    pub index: usize,
    pub content: String,
    pub usage: Usage,
}

/// Summarizes chunks through an [`LLMProvider`]
pub struct Summarizer {
    provider: Arc<dyn LLMProvider>,
    prompt: PromptTemplate,
    sampling: SamplingConfig,
    retry: RetryPolicy,
}

impl Summarizer {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        prompt: PromptTemplate,
        sampling: SamplingConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            prompt,
            sampling,
            retry,
        }
    }

    /// Request a summary of `chunk`, retrying transient failures.
    pub async fn summarize(&self, chunk: &Chunk) -> Result<Summary, CompletionError> {
        if chunk.content.is_empty() {
            return Err(CompletionError::EmptyInput);
        }

        let messages = self.prompt.messages(&chunk.content);

        tracing::debug!(
            provider = self.provider.name(),
            chunk = chunk.index + 1,
            chars = chunk.content.len(),
            "Summarizing chunk"
        );

        let response = self
            .retry
            .run(|| self.provider.completion(&messages, &self.sampling))
            .await?;

        Ok(Summary {
            index: chunk.index,
            content: response.content.trim().to_string(),
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, Message, PromptStyle};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records requests and answers from a script
    struct ScriptedProvider {
        replies: Mutex<Vec<Result<String, CompletionError>>>,
        requests: Mutex<Vec<(Vec<Message>, SamplingConfig)>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn completion(
            &self,
            messages: &[Message],
            sampling: &SamplingConfig,
        ) -> Result<CompletionResponse, CompletionError> {
            self.requests
                .lock()
                .unwrap()
                .push((messages.to_vec(), sampling.clone()));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(CompletionError::MalformedResponse("script empty".into())));
            reply.map(|content| CompletionResponse {
                content,
                usage: Usage { prompt_tokens: 10, completion_tokens: 2, total_tokens: 12 },
            })
        }
    }

    fn summarizer(provider: Arc<ScriptedProvider>) -> Summarizer {
        Summarizer::new(
            provider,
            PromptTemplate::preset(PromptStyle::Concise),
            SamplingConfig::default(),
            RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(1),
            },
        )
    }

    fn chunk(index: usize, content: &str) -> Chunk {
        Chunk { index, content: content.to_string() }
    }

    #[tokio::test]
    async fn test_summary_is_trimmed() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("\n  A short summary.  \n".into())]));
        let summary = summarizer(provider).summarize(&chunk(4, "some text")).await.unwrap();

        assert_eq!(summary.index, 4);
        assert_eq!(summary.content, "A short summary.");
        assert_eq!(summary.usage.total_tokens, 12);
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_sampling() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("ok".into())]));
        summarizer(provider.clone()).summarize(&chunk(0, "body text")).await.unwrap();

        let requests = provider.requests.lock().unwrap();
        let (messages, sampling) = &requests[0];
        assert_eq!(messages[0], Message::system("You are a master class summarizer and note taker."));
        assert!(messages[1].content.ends_with("\n\nbody text"));
        assert_eq!(sampling, &SamplingConfig::default());
    }

    #[tokio::test]
    async fn test_empty_chunk_rejected_without_call() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let result = summarizer(provider.clone()).summarize(&chunk(0, "")).await;

        assert!(matches!(result, Err(CompletionError::EmptyInput)));
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_chunk_is_sent() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("blank".into())]));
        let summary = summarizer(provider.clone()).summarize(&chunk(1, "\n\n\n")).await.unwrap();

        assert_eq!(summary.content, "blank");
        let requests = provider.requests.lock().unwrap();
        assert!(requests[0].0[1].content.ends_with("\n\n\n\n\n"));
    }

    #[tokio::test]
    async fn test_transient_failure_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(CompletionError::Api { status: 429, body: "slow down".into() }),
            Ok("recovered".into()),
        ]));
        let summary = summarizer(provider.clone()).summarize(&chunk(0, "text")).await.unwrap();

        assert_eq!(summary.content, "recovered");
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(CompletionError::Api {
            status: 401,
            body: "invalid key".into(),
        })]));
        let result = summarizer(provider).summarize(&chunk(0, "text")).await;

        assert!(matches!(result, Err(CompletionError::Api { status: 401, .. })));
    }
}
