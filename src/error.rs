//! Error taxonomy for commit message generation.

use thiserror::Error;

/// Minimum number of tokens that must remain for diff content after all
/// reservations; budgets below this are rejected as infeasible.
pub const MIN_DIFF_TOKENS: usize = 500;

/// Errors raised while generating a commit message.
///
/// Budget and truncation errors are computed eagerly, before any network
/// call, so a diff that cannot fit never costs a round trip. Provider and
/// git failures are surfaced unchanged via `anyhow`.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Model id not present in the registry. Recoverable: callers fall
    /// back to a conservative assumed context window and log a warning.
    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    /// The computed diff limit fell below [`MIN_DIFF_TOKENS`]. Fatal to
    /// the invocation; carries the full numeric breakdown so the user
    /// sees exactly where the window went.
    #[error(
        "Model '{model}' context window ({context_window} tokens) is too small. \
         Required: {required} tokens (prompt: {prompt_overhead}, output: {output_reserve}, \
         reserves: {safety_margin}) Available for diff: {available} tokens (need at least {floor})"
    )]
    InfeasibleBudget {
        /// Model identifier the budget was computed for.
        model: String,
        /// Total context window of that model.
        context_window: usize,
        /// Tokens the invocation needs at minimum.
        required: usize,
        /// Estimated prompt template size.
        prompt_overhead: usize,
        /// Tokens reserved for the model's reply.
        output_reserve: usize,
        /// Safety buffer for tokenizer estimation error.
        safety_margin: usize,
        /// What was actually left for diff content (may be negative).
        available: i64,
        /// The minimum floor that was not met.
        floor: usize,
    },

    /// No staged changes to describe. Surfaced as a friendly no-op by the
    /// CLI, not as a failure.
    #[error("No changes to commit")]
    EmptyDiff,

    /// No API key available for the selected provider.
    #[error("No API key found for {provider}. Set {env_var} or pass --api-key")]
    ApiKeyNotFound {
        /// Provider display name.
        provider: String,
        /// Environment variable the key is read from.
        env_var: String,
    },

    /// Provider API request failed with an error response.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Provider returned a response we could not parse.
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}
