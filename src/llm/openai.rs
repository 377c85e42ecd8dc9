//! OpenAI API Provider.
//!
//! Implements the `LLMProvider` trait for OpenAI-compatible Chat Completions
//! endpoints.

use super::provider::LLMProvider;
use super::types::{CompletionResponse, Message, SamplingConfig, Usage};
use crate::error::CompletionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenAI Provider configuration and state.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAIProvider {
    /// Build a provider whose requests are bounded by `timeout`.
    pub fn new(
        api_key: String,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn completion(
        &self,
        messages: &[Message],
        sampling: &SamplingConfig,
    ) -> Result<CompletionResponse, CompletionError> {
        let request = ChatRequest::new(messages, sampling);

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %sampling.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

fn classify_transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Http(e)
    }
}

/// Decode a successful response body into the top choice.
fn parse_response(body: &str) -> Result<CompletionResponse, CompletionError> {
    let chat_response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    let choice = chat_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("no choices returned".to_string()))?;

    let content = choice.message.content.ok_or_else(|| {
        CompletionError::MalformedResponse("first choice has no message content".to_string())
    })?;

    Ok(CompletionResponse {
        content,
        usage: chat_response.usage.map(Usage::from).unwrap_or_default(),
    })
}

// -----------------------------------------------------------------------------
// OpenAI DTOs (Data Transfer Objects)
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    frequency_penalty: f32,
    presence_penalty: f32,
}

impl<'a> ChatRequest<'a> {
    fn new(messages: &'a [Message], sampling: &'a SamplingConfig) -> Self {
        Self {
            model: &sampling.model,
            messages: messages.iter().map(ApiMessage::from).collect(),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            frequency_penalty: sampling.frequency_penalty,
            presence_penalty: sampling.presence_penalty,
        }
    }
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ApiMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
    #[serde(default)]
    total_tokens: usize,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let messages = vec![Message::system("sys"), Message::user("summarize this")];
        let sampling = SamplingConfig {
            model: "gpt-test".to_string(),
            temperature: 0.5,
            max_tokens: Some(1500),
            frequency_penalty: 0.0,
            presence_penalty: 0.25,
        };

        let body = serde_json::to_value(ChatRequest::new(&messages, &sampling)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-test",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "summarize this"}
                ],
                "temperature": 0.5,
                "max_tokens": 1500,
                "frequency_penalty": 0.0,
                "presence_penalty": 0.25
            })
        );
    }

    #[test]
    fn test_request_omits_unset_max_tokens() {
        let sampling = SamplingConfig {
            max_tokens: None,
            ..SamplingConfig::default()
        };
        let body = serde_json::to_value(ChatRequest::new(&[], &sampling)).unwrap();
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_first_choice() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "  first  "}},
                {"message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })
        .to_string();

        let response = parse_response(&body).unwrap();
        assert_eq!(response.content, "  first  ");
        assert_eq!(response.usage.total_tokens, 15);
    }

    #[test]
    fn test_parse_without_usage() {
        let body = json!({"choices": [{"message": {"content": "ok"}}]}).to_string();
        let response = parse_response(&body).unwrap();
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn test_parse_no_choices() {
        let body = json!({"choices": []}).to_string();
        assert!(matches!(
            parse_response(&body),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_null_content() {
        let body = json!({"choices": [{"message": {"content": null}}]}).to_string();
        assert!(matches!(
            parse_response(&body),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAIProvider::new(
            "key".to_string(),
            "http://localhost:8080/v1/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
