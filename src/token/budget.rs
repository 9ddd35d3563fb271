//! Token budget calculation.
//!
//! Splits a model's context window between the prompt template, the
//! reserved reply, a safety buffer, and whatever is left for diff
//! content. Pure arithmetic; validated before any network call is made.

use crate::error::{GenerateError, MIN_DIFF_TOKENS};

/// Token allocation for one generation request.
///
/// Constructed fresh per invocation via [`TokenBudget::compute`] and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBudget {
    /// Total context window of the target model.
    pub context_window: usize,
    /// Tokens reserved for the model's reply.
    pub output_reserve: usize,
    /// Estimated size of the rendered prompt excluding the diff.
    pub prompt_overhead: usize,
    /// Buffer absorbing tokenizer estimation error.
    pub safety_margin: usize,
    /// Maximum tokens available for diff content.
    pub diff_limit: usize,
}

impl TokenBudget {
    /// Computes the diff budget for a model.
    ///
    /// `diff_limit = context_window − output_reserve − prompt_overhead −
    /// safety_margin`, further capped by `user_max_diff_tokens` when one
    /// is supplied. Fails with [`GenerateError::InfeasibleBudget`] when
    /// the result falls below [`MIN_DIFF_TOKENS`] — never silently
    /// clamped.
    pub fn compute(
        model: &str,
        context_window: usize,
        output_reserve: usize,
        prompt_overhead: usize,
        safety_margin: usize,
        user_max_diff_tokens: Option<usize>,
    ) -> Result<Self, GenerateError> {
        let reserved = output_reserve + prompt_overhead + safety_margin;
        let auto_limit = context_window as i64 - reserved as i64;
        let available = match user_max_diff_tokens {
            Some(cap) => auto_limit.min(cap as i64),
            None => auto_limit,
        };

        if available < MIN_DIFF_TOKENS as i64 {
            return Err(GenerateError::InfeasibleBudget {
                model: model.to_string(),
                context_window,
                required: reserved + MIN_DIFF_TOKENS,
                prompt_overhead,
                output_reserve,
                safety_margin,
                available,
                floor: MIN_DIFF_TOKENS,
            });
        }

        Ok(Self {
            context_window,
            output_reserve,
            prompt_overhead,
            safety_margin,
            diff_limit: available as usize,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn auto_limit_is_window_minus_reserves() {
        // 8192 - 1500 - 850 - 600 = 5242, comfortably above the 500 floor.
        let budget = TokenBudget::compute("gpt-4", 8192, 1500, 850, 600, None).unwrap();
        assert_eq!(budget.diff_limit, 5242);
        assert_eq!(budget.context_window, 8192);
        assert_eq!(budget.output_reserve, 1500);
        assert_eq!(budget.prompt_overhead, 850);
        assert_eq!(budget.safety_margin, 600);
    }

    #[test]
    fn user_cap_lowers_the_limit() {
        let budget = TokenBudget::compute("gpt-4", 8192, 1500, 850, 600, Some(2000)).unwrap();
        assert_eq!(budget.diff_limit, 2000);
    }

    #[test]
    fn user_cap_above_auto_limit_is_ignored() {
        let budget = TokenBudget::compute("gpt-4", 8192, 1500, 850, 600, Some(100_000)).unwrap();
        assert_eq!(budget.diff_limit, 5242);
    }

    #[test]
    fn user_cap_below_floor_is_infeasible() {
        let err = TokenBudget::compute("gpt-4", 8192, 1500, 850, 600, Some(100)).unwrap_err();
        match err {
            GenerateError::InfeasibleBudget {
                model,
                context_window,
                required,
                prompt_overhead,
                output_reserve,
                safety_margin,
                available,
                floor,
            } => {
                assert_eq!(model, "gpt-4");
                assert_eq!(context_window, 8192);
                assert_eq!(required, 1500 + 850 + 600 + 500);
                assert_eq!(prompt_overhead, 850);
                assert_eq!(output_reserve, 1500);
                assert_eq!(safety_margin, 600);
                assert_eq!(available, 100);
                assert_eq!(floor, 500);
            }
            other => panic!("expected InfeasibleBudget, got {other:?}"),
        }
    }

    #[test]
    fn tiny_window_is_infeasible_with_negative_available() {
        let err = TokenBudget::compute("small-model", 2000, 1500, 850, 600, None).unwrap_err();
        match err {
            GenerateError::InfeasibleBudget { available, .. } => {
                assert_eq!(available, 2000 - 1500 - 850 - 600);
                assert!(available < 0);
            }
            other => panic!("expected InfeasibleBudget, got {other:?}"),
        }
    }

    #[test]
    fn exact_floor_is_feasible() {
        // available == floor exactly: allowed.
        let budget = TokenBudget::compute("m", 3450, 1500, 850, 600, None).unwrap();
        assert_eq!(budget.diff_limit, 500);

        // One token short: rejected.
        assert!(TokenBudget::compute("m", 3449, 1500, 850, 600, None).is_err());
    }

    #[test]
    fn compute_is_pure_and_deterministic() {
        let a = TokenBudget::compute("gpt-4", 8192, 1500, 850, 600, None).unwrap();
        let b = TokenBudget::compute("gpt-4", 8192, 1500, 850, 600, None).unwrap();
        assert_eq!(a, b);
    }
}
