//! AI provider clients and the unified client trait.

pub mod claude;
pub mod openai;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::error::GenerateError;
use crate::token::registry::model_registry;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI chat completions.
    OpenAi,
    /// Groq's OpenAI-compatible API.
    Groq,
    /// Anthropic messages API.
    Claude,
    /// OpenRouter's OpenAI-compatible aggregator.
    OpenRouter,
}

impl Provider {
    /// Provider name as it appears in the catalog and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::Claude => "claude",
            Self::OpenRouter => "openrouter",
        }
    }

    /// All supported providers.
    pub fn all() -> &'static [Provider] {
        &[Self::OpenAi, Self::Groq, Self::Claude, Self::OpenRouter]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "claude" => Ok(Self::Claude),
            "openrouter" => Ok(Self::OpenRouter),
            other => Err(anyhow!(
                "unsupported provider '{other}' (supported: openai, groq, claude, openrouter)"
            )),
        }
    }
}

/// Metadata about an AI client implementation.
#[derive(Clone, Debug)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the raw response
    /// text. `max_output_tokens` is a generation-length hint matching
    /// the orchestrator's output reservation.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        max_output_tokens: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}

/// Resolves the API key for a provider: explicit flag first, then the
/// provider's environment variable.
pub fn resolve_api_key(provider: Provider, explicit: Option<String>) -> Result<String> {
    if let Some(key) = explicit {
        return Ok(key);
    }
    let registry = model_registry();
    let config = registry
        .provider(provider.as_str())
        .ok_or_else(|| anyhow!("provider '{provider}' missing from catalog"))?;

    std::env::var(&config.env_var).map_err(|_| {
        GenerateError::ApiKeyNotFound {
            provider: config.name.clone(),
            env_var: config.env_var.clone(),
        }
        .into()
    })
}

/// Builds the client for a provider/model pair.
///
/// Groq and OpenRouter speak the OpenAI wire format against their own
/// base URLs; only Anthropic needs a separate client.
pub fn create_client(provider: Provider, model: String, api_key: String) -> Result<Box<dyn AiClient>> {
    let registry = model_registry();
    let base_url = registry
        .provider(provider.as_str())
        .map(|p| p.api_base.clone())
        .ok_or_else(|| anyhow!("provider '{provider}' missing from catalog"))?;

    Ok(match provider {
        Provider::Claude => Box::new(claude::ClaudeClient::new(model, api_key, base_url)),
        Provider::OpenAi | Provider::Groq | Provider::OpenRouter => Box::new(
            openai::OpenAiCompatClient::new(provider.as_str(), model, api_key, base_url),
        ),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn provider_parsing_round_trips() {
        for provider in Provider::all() {
            assert_eq!(
                provider.as_str().parse::<Provider>().unwrap(),
                *provider
            );
        }
        assert!("gemini".parse::<Provider>().is_err());
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let key = resolve_api_key(Provider::OpenAi, Some("sk-explicit".to_string())).unwrap();
        assert_eq!(key, "sk-explicit");
    }

    #[test]
    fn create_client_reports_provider_metadata() {
        let client =
            create_client(Provider::Groq, "qwen/qwen3-32b".to_string(), "gsk_x".to_string())
                .unwrap();
        let meta = client.get_metadata();
        assert_eq!(meta.provider, "groq");
        assert_eq!(meta.model, "qwen/qwen3-32b");

        let client = create_client(
            Provider::Claude,
            "claude-sonnet-4-5".to_string(),
            "sk-ant".to_string(),
        )
        .unwrap();
        assert_eq!(client.get_metadata().provider, "claude");
    }
}
