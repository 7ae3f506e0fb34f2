//! OpenAI-compatible chat completions client.
//!
//! Works against any provider exposing `/chat/completions` (OpenAI,
//! OpenRouter, Groq, a local vLLM, ...). One request per chat turn, no
//! streaming and no retries.

use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::send_json;
use crate::config::LlmConfig;
use crate::error::{AppError, AppResult};

const SOURCE: &str = "llm";

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

// ── request/response types ──────────────────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

impl LlmClient {
    pub fn new(config: &LlmConfig, client: Client) -> Self {
        tracing::debug!(base_url = %config.base_url, model = %config.model, "Creating LLM client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Text of the first choice.
    pub async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        if !self.is_configured() {
            return Err(AppError::Config(
                "LLM API key is not set (SONAR__LLM__API_KEY)".to_string(),
            ));
        }

        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, msg_count = messages.len(), "Sending chat completion request");

        let request = self.client.post(&url).bearer_auth(&self.api_key).json(&body);
        let response: CompletionResponse = send_json(SOURCE, request).await?;

        let reply = extract_reply(response)?;

        println!(
            "[LLM] {} replied with {} chars ({}ms)",
            self.model,
            reply.len(),
            start.elapsed().as_millis()
        );
        tracing::info!(
            model = %self.model,
            reply_chars = %reply.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Chat completion finished"
        );

        Ok(reply)
    }
}

fn extract_reply(response: CompletionResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::ExternalApi("LLM returned an empty completion".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_reply() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "  SOL is up.\n" }, "finish_reason": "stop" }]
        }))
        .unwrap();
        assert_eq!(extract_reply(response).unwrap(), "SOL is up.");

        let empty: CompletionResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(extract_reply(empty), Err(AppError::ExternalApi(_))));
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("persona"), ChatMessage::user("hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            max_tokens: 800,
            temperature: 0.5,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 800);
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let client = LlmClient::new(&LlmConfig::default(), Client::new());
        assert!(!client.is_configured());
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
