//! Commit-message orchestration.
//!
//! Sequences budget calculation, diff truncation, prompt rendering, the
//! provider call, and output cleanup. All budget and truncation errors
//! are raised before any network call so a diff that cannot fit never
//! costs a round trip.

pub mod cleanup;

use anyhow::Result;
use tracing::{debug, warn};

use crate::ai::{AiClient, Provider};
use crate::error::GenerateError;
use crate::prompts::{self, CommitStyle};
use crate::token::registry::model_registry;
use crate::token::{truncate, TokenBudget, TokenCounter, TruncationResult};

/// Tokens reserved for the model's reply when the user doesn't override.
pub const DEFAULT_OUTPUT_RESERVE: usize = 1500;

/// Buffer absorbing tokenizer estimation error.
const SAFETY_MARGIN_TOKENS: usize = 500;

/// Reservation for the staged-file list rendered into the prompt.
const FILE_LIST_RESERVE_TOKENS: usize = 100;

/// Options for one commit-message generation.
#[derive(Debug, Clone)]
pub struct CommitMessageOptions {
    /// Message style to render.
    pub style: CommitStyle,
    /// Target provider.
    pub provider: Provider,
    /// Model override; the provider's default when `None`.
    pub model: Option<String>,
    /// Tokens reserved for the reply.
    pub output_reserve: usize,
    /// Optional user cap on diff tokens.
    pub max_diff_tokens: Option<usize>,
}

impl CommitMessageOptions {
    /// Resolves the model id, falling back to the provider default.
    pub fn resolve_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        model_registry()
            .default_model(self.provider.as_str())
            .unwrap_or("gpt-4o-mini")
            .to_string()
    }
}

/// Token accounting for one generation, rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens allocated to diff content.
    pub diff_limit: usize,
    /// Tokens reserved for the reply.
    pub output_reserve: usize,
    /// Token count of the raw diff before fitting.
    pub original_diff_tokens: usize,
    /// Token count actually sent.
    pub fitted_diff_tokens: usize,
    /// Whether the diff was reduced to fit.
    pub truncated: bool,
}

impl TokenUsage {
    /// The allocation summary line.
    pub fn allocation_line(&self) -> String {
        format!(
            "Token allocation - Diff: {} | Output: {}",
            self.diff_limit, self.output_reserve
        )
    }

    /// The diff-size line: within-limit or truncation warning.
    pub fn diff_line(&self) -> String {
        if self.truncated {
            format!(
                "⚠ Diff truncated: {} → {} tokens",
                self.original_diff_tokens, self.fitted_diff_tokens
            )
        } else {
            format!("Diff size: {} tokens (within limit)", self.original_diff_tokens)
        }
    }
}

/// A generated commit message with its truncation and usage metadata.
#[derive(Debug)]
pub struct GeneratedMessage {
    /// The cleaned-up message text.
    pub message: String,
    /// How the diff was fitted.
    pub truncation: TruncationResult,
    /// Token accounting.
    pub usage: TokenUsage,
}

/// What the user chose to do with a generated message.
///
/// Interactive control flow stays outside the core: the CLI (or any
/// other caller) supplies the answer through this port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Commit with the message as generated (possibly after editing).
    Commit,
    /// Open the message in an editor first.
    Edit,
    /// Abandon the commit.
    Cancel,
}

/// Computes the token budget for `options` against the registry.
///
/// Unknown models fall back to the provider's assumed window with a
/// warning rather than failing.
pub fn budget_for(options: &CommitMessageOptions) -> Result<TokenBudget, GenerateError> {
    let model = options.resolve_model();
    let registry = model_registry();

    let context_window = match registry.lookup(&model) {
        Ok(spec) => spec.context_window,
        Err(GenerateError::UnknownModel(_)) => {
            let assumed =
                registry.context_window_or_default(&model, options.provider.as_str());
            warn!(model = %model, assumed, "model not in catalog; assuming conservative context window");
            assumed
        }
        Err(e) => return Err(e),
    };

    TokenBudget::compute(
        &model,
        context_window,
        options.output_reserve,
        options.style.prompt_overhead(),
        SAFETY_MARGIN_TOKENS + FILE_LIST_RESERVE_TOKENS,
        options.max_diff_tokens,
    )
}

/// Generates a commit message for the staged changes.
///
/// `raw_diff` and `staged_files` come from the git collaborator; the
/// provider client is injected so the core stays free of credential and
/// transport concerns. Provider failures propagate unchanged.
pub async fn generate_commit_message(
    options: &CommitMessageOptions,
    raw_diff: &str,
    staged_files: &[String],
    client: &dyn AiClient,
) -> Result<GeneratedMessage> {
    if raw_diff.trim().is_empty() {
        return Err(GenerateError::EmptyDiff.into());
    }

    let budget = budget_for(options)?;
    let counter = TokenCounter::for_provider(options.provider.as_str());

    let original_diff_tokens = counter.count(raw_diff);
    let truncation = truncate::fit(raw_diff, &budget, &counter);
    debug!(
        original_tokens = original_diff_tokens,
        fitted_tokens = truncation.total_included_tokens,
        included = truncation.included.len(),
        excluded = truncation.excluded_count,
        "fitted diff into budget"
    );

    let fitted = truncation.fitted_text();
    let rendered = prompts::render(options.style, staged_files, &fitted)?;

    let raw_output = client
        .send_request(&rendered.system, &rendered.user, options.output_reserve)
        .await?;
    let message = cleanup::clean_model_output(&raw_output);

    let usage = TokenUsage {
        diff_limit: budget.diff_limit,
        output_reserve: budget.output_reserve,
        original_diff_tokens,
        fitted_diff_tokens: truncation.total_included_tokens,
        truncated: truncation.truncated,
    };

    Ok(GeneratedMessage {
        message,
        truncation,
        usage,
    })
}
