//! Post-processing of raw model output into a usable commit message.
//!
//! Reasoning models wrap their answer in think-blocks and chat models
//! like to add markdown fences or chatty preambles. Cleanup strips all
//! of that and, when a conventional-commit-shaped line is present,
//! re-anchors the message on it.

use std::sync::OnceLock;

use regex::Regex;

#[allow(clippy::expect_used)] // static pattern
fn think_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(think|thinking|analysis|thought)>.*?</(think|thinking|analysis|thought)>")
            .expect("invalid think-block pattern")
    })
}

#[allow(clippy::expect_used)] // static pattern
fn conventional_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(feat|fix|docs|style|refactor|test|chore|perf|ci|build|revert)(\([^)]*\))?!?:\s")
            .expect("invalid conventional-commit pattern")
    })
}

/// Removes a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    match body.split_once('\n') {
        Some((first, tail)) if !first.trim().contains(' ') && first.len() < 20 => tail.trim(),
        _ => body.trim(),
    }
}

/// Cleans raw model output into a commit message.
///
/// Strips reasoning blocks and markdown fences, then keeps everything
/// from the first conventional-commit-shaped line onward when one
/// exists. Otherwise the trimmed text is returned as-is.
pub fn clean_model_output(raw: &str) -> String {
    let without_thinking = think_block_re().replace_all(raw, "");
    let unfenced = strip_code_fence(&without_thinking);

    if let Some(m) = conventional_line_re().find(unfenced) {
        return unfenced[m.start()..].trim().to_string();
    }
    unfenced.trim().to_string()
}
