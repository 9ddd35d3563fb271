//! OpenAI-compatible chat-completions client.
//!
//! Serves OpenAI itself plus Groq and OpenRouter, which expose the same
//! wire format on their own base URLs.

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

/// Chat request message.
#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

/// Chat completions request body.
#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

/// One response choice.
#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: String,
}

/// Chat completions response body.
#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// OpenAI-compatible API client.
pub struct OpenAiCompatClient {
    /// HTTP client for API requests.
    client: Client,
    /// Provider name (openai, groq, openrouter) for metadata and logs.
    provider: &'static str,
    /// API key for bearer authentication.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Base URL (e.g. "https://api.openai.com").
    base_url: String,
}

impl OpenAiCompatClient {
    /// Creates a new client against the given base URL.
    pub fn new(provider: &'static str, model: String, api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            provider,
            api_key,
            model,
            base_url,
        }
    }

    /// Builds the full chat-completions URL.
    fn api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/v1/chat/completions")
    }
}

impl AiClient for OpenAiCompatClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        max_output_tokens: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: vec![
                    Message {
                        role: "system".to_string(),
                        content: system_prompt.to_string(),
                    },
                    Message {
                        role: "user".to_string(),
                        content: user_prompt.to_string(),
                    },
                ],
                max_tokens: max_output_tokens,
                temperature: TEMPERATURE,
                stream: false,
            };

            let url = self.api_url();
            info!(url = %url, model = %self.model, provider = self.provider, "sending chat completions request");

            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
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

            let chat_response: ChatResponse = response
                .json()
                .await
                .map_err(|e| GenerateError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                choice_count = chat_response.choices.len(),
                "received chat completions response"
            );

            chat_response
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content.trim().to_string())
                .ok_or_else(|| {
                    GenerateError::InvalidResponseFormat("No choices in response".to_string())
                        .into()
                })
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: self.provider.to_string(),
            model: self.model.clone(),
        }
    }
}
