//! Token counting for diff content.
//!
//! Counts exactly with the `cl100k_base` BPE when available; falls back
//! to a deterministic character heuristic for unknown tokenizers. The
//! counter also cuts token-exact prefixes for the truncator's
//! partial-file fallback.

use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Characters per token assumed by the heuristic.
///
/// Deliberately conservative for code and diff text, which tokenizes
/// denser than prose.
const HEURISTIC_CHARS_PER_TOKEN: usize = 3;

/// Counts tokens for one model family.
///
/// All currently supported providers (OpenAI, Groq, Claude, OpenRouter)
/// are counted with `cl100k_base`; the heuristic path exists for
/// tokenizers we cannot load and flags its results as approximate.
pub struct TokenCounter {
    bpe: Option<CoreBPE>,
}

impl TokenCounter {
    /// Creates a counter for the given provider family.
    ///
    /// Falls back to the heuristic (with a warning) if the encoding
    /// cannot be constructed.
    pub fn for_provider(provider: &str) -> Self {
        match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Self { bpe: Some(bpe) },
            Err(e) => {
                warn!(provider, error = %e, "failed to load cl100k_base; using approximate token counts");
                Self { bpe: None }
            }
        }
    }

    /// Creates a counter that always uses the character heuristic.
    pub fn approximate() -> Self {
        Self { bpe: None }
    }

    /// Whether counts from this counter are exact.
    pub fn is_exact(&self) -> bool {
        self.bpe.is_some()
    }

    /// Counts tokens in `text`. Empty text is always zero tokens.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        match &self.bpe {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => text.len() / HEURISTIC_CHARS_PER_TOKEN,
        }
    }

    /// Cuts a prefix of `text` that counts to at most `max_tokens`,
    /// returning the prefix and its token count.
    ///
    /// With the exact tokenizer the prefix is token-exact: exactly
    /// `max_tokens` tokens when the input is long enough. The heuristic
    /// path cuts at the equivalent byte length, backed off to a char
    /// boundary.
    pub fn truncate_to(&self, text: &str, max_tokens: usize) -> (String, usize) {
        if max_tokens == 0 || text.is_empty() {
            return (String::new(), 0);
        }
        if let Some(bpe) = &self.bpe {
            let tokens = bpe.encode_ordinary(text);
            if tokens.len() <= max_tokens {
                return (text.to_string(), tokens.len());
            }
            // A cut can land mid-codepoint; back off until the prefix
            // decodes cleanly.
            let mut keep = max_tokens;
            while keep > 0 {
                if let Ok(prefix) = bpe.decode(tokens[..keep].to_vec()) {
                    return (prefix, keep);
                }
                keep -= 1;
            }
            return (String::new(), 0);
        }

        let max_bytes = max_tokens.saturating_mul(HEURISTIC_CHARS_PER_TOKEN);
        if text.len() <= max_bytes {
            return (text.to_string(), self.count(text));
        }
        let mut cut = max_bytes;
        while cut > 0 && !text.is_char_boundary(cut) {
            cut -= 1;
        }
        let prefix = &text[..cut];
        (prefix.to_string(), self.count(prefix))
    }
}
