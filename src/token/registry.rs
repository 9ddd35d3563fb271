//! Model registry: context windows and provider metadata.
//!
//! Loaded once from an embedded YAML catalog so the rest of the crate can
//! look up a model's token capacity without I/O.

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::Result;
use serde::Deserialize;

use crate::error::GenerateError;

/// Context window assumed for models missing from the catalog.
///
/// Deliberately conservative; callers log a warning when this kicks in.
pub const FALLBACK_CONTEXT_WINDOW: usize = 8000;

/// One model's specification from the catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelSpec {
    /// Provider family this model belongs to.
    pub provider: String,
    /// API identifier used for requests (e.g. "gpt-4o-mini").
    pub id: String,
    /// Total context window in tokens (input + output).
    pub context_window: usize,
}

/// Default fallbacks for models a provider serves but the catalog omits.
#[derive(Debug, Deserialize)]
pub struct ProviderDefaults {
    /// Assumed context window for unknown models from this provider.
    pub context_window: usize,
}

/// Per-provider metadata.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Human-readable provider name.
    pub name: String,
    /// Environment variable holding the API key.
    pub env_var: String,
    /// Base URL for API requests.
    pub api_base: String,
    /// Model used when none is specified.
    pub default_model: String,
    /// Fallbacks for unknown models.
    pub defaults: ProviderDefaults,
}

/// The full embedded catalog.
#[derive(Debug, Deserialize)]
struct Catalog {
    models: Vec<ModelSpec>,
    providers: HashMap<String, ProviderConfig>,
}

/// Registry of supported models and providers.
pub struct ModelRegistry {
    catalog: Catalog,
    by_id: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Loads the registry from the embedded YAML catalog.
    pub fn load() -> Result<Self> {
        let yaml = include_str!("../../templates/models.yaml");
        let catalog: Catalog = serde_yaml::from_str(yaml)?;

        let by_id = catalog
            .models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();

        Ok(Self { catalog, by_id })
    }

    /// Looks up a model by API identifier.
    pub fn lookup(&self, model_id: &str) -> Result<&ModelSpec, GenerateError> {
        self.by_id
            .get(model_id)
            .map(|&i| &self.catalog.models[i])
            .ok_or_else(|| GenerateError::UnknownModel(model_id.to_string()))
    }

    /// Returns the context window for a model, falling back to the
    /// provider's default (or [`FALLBACK_CONTEXT_WINDOW`]) for unknown ids.
    pub fn context_window_or_default(&self, model_id: &str, provider: &str) -> usize {
        match self.lookup(model_id) {
            Ok(spec) => spec.context_window,
            Err(_) => self
                .provider(provider)
                .map_or(FALLBACK_CONTEXT_WINDOW, |p| p.defaults.context_window),
        }
    }

    /// Returns provider metadata by name.
    pub fn provider(&self, provider: &str) -> Option<&ProviderConfig> {
        self.catalog.providers.get(provider)
    }

    /// Returns the default model id for a provider, if configured.
    pub fn default_model(&self, provider: &str) -> Option<&str> {
        self.provider(provider).map(|p| p.default_model.as_str())
    }

    /// All models in catalog order.
    pub fn models(&self) -> &[ModelSpec] {
        &self.catalog.models
    }

    /// Models served by one provider, in catalog order.
    pub fn models_for_provider(&self, provider: &str) -> Vec<&ModelSpec> {
        self.catalog
            .models
            .iter()
            .filter(|m| m.provider == provider)
            .collect()
    }
}

/// Global registry instance.
static MODEL_REGISTRY: OnceLock<ModelRegistry> = OnceLock::new();

/// Returns the process-wide model registry.
#[allow(clippy::expect_used)] // embedded catalog; a parse failure is a build defect
pub fn model_registry() -> &'static ModelRegistry {
    MODEL_REGISTRY.get_or_init(|| ModelRegistry::load().expect("failed to load model catalog"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn catalog_loads_with_all_providers() {
        let registry = ModelRegistry::load().unwrap();
        assert!(!registry.models().is_empty());
        for p in ["openai", "groq", "claude", "openrouter"] {
            assert!(registry.provider(p).is_some(), "missing provider {p}");
        }
    }

    #[test]
    fn lookup_known_models() {
        let registry = model_registry();

        let spec = registry.lookup("gpt-4o-mini").unwrap();
        assert_eq!(spec.provider, "openai");
        assert_eq!(spec.context_window, 128_000);

        let spec = registry.lookup("gpt-4").unwrap();
        assert_eq!(spec.context_window, 8192);

        let spec = registry.lookup("qwen/qwen3-32b").unwrap();
        assert_eq!(spec.provider, "groq");
        assert_eq!(spec.context_window, 32_768);

        let spec = registry.lookup("claude-sonnet-4-5").unwrap();
        assert_eq!(spec.provider, "claude");
        assert_eq!(spec.context_window, 200_000);
    }

    #[test]
    fn lookup_unknown_model_fails() {
        let registry = model_registry();
        let err = registry.lookup("gpt-99-ultra").unwrap_err();
        assert!(matches!(err, GenerateError::UnknownModel(ref m) if m == "gpt-99-ultra"));
    }

    #[test]
    fn unknown_model_falls_back_to_provider_default() {
        let registry = model_registry();
        assert_eq!(
            registry.context_window_or_default("gpt-99-ultra", "openai"),
            8000
        );
        // Unknown provider too: conservative constant.
        assert_eq!(
            registry.context_window_or_default("mystery", "not-a-provider"),
            FALLBACK_CONTEXT_WINDOW
        );
    }

    #[test]
    fn provider_defaults_and_env_vars() {
        let registry = model_registry();

        let openai = registry.provider("openai").unwrap();
        assert_eq!(openai.env_var, "OPENAI_API_KEY");
        assert_eq!(registry.default_model("openai"), Some("gpt-4o-mini"));

        let claude = registry.provider("claude").unwrap();
        assert_eq!(claude.env_var, "ANTHROPIC_API_KEY");
        assert_eq!(registry.default_model("claude"), Some("claude-sonnet-4-5"));

        assert_eq!(registry.default_model("groq"), Some("qwen/qwen3-32b"));
        assert_eq!(
            registry.default_model("openrouter"),
            Some("openai/gpt-4o-mini")
        );
    }

    #[test]
    fn models_for_provider_preserves_catalog_order() {
        let registry = model_registry();
        let groq = registry.models_for_provider("groq");
        assert_eq!(groq.len(), 5);
        assert_eq!(groq[0].id, "qwen/qwen3-32b");
        assert!(groq.iter().all(|m| m.provider == "groq"));
    }
}
