//! Anthropic messages-API client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AiClient, AiClientMetadata};
use crate::error::GenerateError;

/// Sampling temperature for commit message generation.
const TEMPERATURE: f32 = 0.7;

/// Messages API request message.
#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

/// Messages API request body.
#[derive(Serialize, Debug)]
struct ClaudeRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

/// One content block from the response.
#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Messages API response body.
#[derive(Deserialize, Debug)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

/// Anthropic API client.
pub struct ClaudeClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key sent in the `x-api-key` header.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Base URL (normally "https://api.anthropic.com").
    base_url: String,
}

impl ClaudeClient {
    /// Creates a new Anthropic client.
    pub fn new(model: String, api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    fn api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/v1/messages")
    }
}

impl AiClient for ClaudeClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        max_output_tokens: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = ClaudeRequest {
                model: self.model.clone(),
                max_tokens: max_output_tokens,
                temperature: TEMPERATURE,
                system: system_prompt.to_string(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                }],
            };

            let url = self.api_url();
            info!(url = %url, model = %self.model, "sending messages request");

            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| GenerateError::NetworkError(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(
                    GenerateError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into(),
                );
            }

            let claude_response: ClaudeResponse = response
                .json()
                .await
                .map_err(|e| GenerateError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                block_count = claude_response.content.len(),
                "received messages response"
            );

            let text: Vec<&str> = claude_response
                .content
                .iter()
                .filter(|block| block.block_type == "text")
                .map(|block| block.text.as_str())
                .collect();

            if text.is_empty() {
                return Err(GenerateError::InvalidResponseFormat(
                    "No text content in response".to_string(),
                )
                .into());
            }

            Ok(text.join(" ").trim().to_string())
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "claude".to_string(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn joins_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "fix: clamp"},
                    {"type": "text", "text": "diff budget"}
                ]
            })))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(
            "claude-sonnet-4-5".to_string(),
            "sk-ant-test".to_string(),
            server.uri(),
        );
        let text = client.send_request("sys", "user", 1500).await.unwrap();
        assert_eq!(text, "fix: clamp diff budget");
    }

    #[tokio::test]
    async fn non_text_blocks_only_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "tool_use", "text": ""}]
            })))
            .mount(&server)
            .await;

        let client = ClaudeClient::new("claude-sonnet-4-5".to_string(), "k".to_string(), server.uri());
        let err = client.send_request("sys", "user", 1500).await.unwrap_err();
        assert!(err.to_string().contains("No text content"));
    }
}
