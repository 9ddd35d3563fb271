//! Diff segmentation and token-budget truncation.
//!
//! Splits a raw unified diff into per-file units and greedily selects a
//! maximal ordered prefix of whole units that fits the diff budget. File
//! boundaries are never crossed, with one exception: when not even the
//! first file fits on its own, a token-exact prefix of that file is taken
//! so the model always sees something.

use super::budget::TokenBudget;
use super::counter::TokenCounter;

/// Marker that begins a per-file section in unified diff output.
const FILE_DIFF_MARKER: &str = "diff --git a/";

/// One file's slice of the diff, in diff-appearance order.
///
/// Appearance order is treated as significance order: files touched
/// first are assumed most relevant and are kept preferentially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffUnit {
    /// Path of the file (the `b/` side of the `diff --git` header).
    pub file_path: String,
    /// Raw text of this file's diff (header plus all hunks).
    pub raw_text: String,
    /// Token count of `raw_text`.
    pub token_count: usize,
}

/// How the diff was reduced to fit the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationKind {
    /// Everything fit; nothing was dropped.
    None,
    /// Whole trailing files were dropped.
    WholeUnits,
    /// Not even the first file fit; a prefix of it was taken.
    PartialPrefix,
}

/// Outcome of fitting a diff into a token budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationResult {
    /// Whole units that made the cut, in input order.
    pub included: Vec<DiffUnit>,
    /// Number of units left out entirely.
    pub excluded_count: usize,
    /// Token total of the included content.
    pub total_included_tokens: usize,
    /// Whether anything was dropped or cut.
    pub truncated: bool,
    /// Prefix of the first file, present only in the fallback case.
    pub partial_first_file: Option<String>,
    /// Tag distinguishing whole-unit truncation from the prefix fallback.
    pub kind: TruncationKind,
}

impl TruncationResult {
    /// The diff text to hand to the model.
    pub fn fitted_text(&self) -> String {
        match &self.partial_first_file {
            Some(prefix) => prefix.clone(),
            None => self
                .included
                .iter()
                .map(|u| u.raw_text.as_str())
                .collect(),
        }
    }

    /// Paths of the included files, in order.
    pub fn included_paths(&self) -> Vec<&str> {
        self.included.iter().map(|u| u.file_path.as_str()).collect()
    }
}

/// Fits `raw_diff` into `budget.diff_limit` tokens.
///
/// Always produces a result; infeasible budgets were already rejected by
/// [`TokenBudget::compute`]. Deterministic for identical inputs.
pub fn fit(raw_diff: &str, budget: &TokenBudget, counter: &TokenCounter) -> TruncationResult {
    let units = split_into_units(raw_diff, counter);

    if units.is_empty() {
        return TruncationResult {
            included: Vec::new(),
            excluded_count: 0,
            total_included_tokens: 0,
            truncated: false,
            partial_first_file: None,
            kind: TruncationKind::None,
        };
    }

    // Greedy in-order pass over whole files: stop at the first unit that
    // would overflow the limit.
    let mut included = Vec::new();
    let mut running_total = 0usize;
    for unit in &units {
        if running_total + unit.token_count > budget.diff_limit {
            break;
        }
        running_total += unit.token_count;
        included.push(unit.clone());
    }

    if included.is_empty() {
        // Even the first file alone exceeds the limit: take a token-exact
        // prefix of it so the result is never empty.
        let (prefix, prefix_tokens) = counter.truncate_to(&units[0].raw_text, budget.diff_limit);
        return TruncationResult {
            included: Vec::new(),
            excluded_count: units.len() - 1,
            total_included_tokens: prefix_tokens,
            truncated: true,
            partial_first_file: Some(prefix),
            kind: TruncationKind::PartialPrefix,
        };
    }

    let excluded_count = units.len() - included.len();
    TruncationResult {
        included,
        excluded_count,
        total_included_tokens: running_total,
        truncated: excluded_count > 0,
        partial_first_file: None,
        kind: if excluded_count > 0 {
            TruncationKind::WholeUnits
        } else {
            TruncationKind::None
        },
    }
}

/// Splits a flat unified diff at `diff --git a/` line boundaries.
///
/// Content before the first marker (stray notices, whitespace) is not a
/// file unit and is dropped. Empty input yields no units.
pub fn split_into_units(raw_diff: &str, counter: &TokenCounter) -> Vec<DiffUnit> {
    let mut units: Vec<DiffUnit> = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in raw_diff.split_inclusive('\n') {
        if line.starts_with(FILE_DIFF_MARKER) {
            if let Some((path, text)) = current.take() {
                units.push(make_unit(path, text, counter));
            }
            current = Some((path_from_header(line), String::new()));
        }
        if let Some((_, text)) = current.as_mut() {
            text.push_str(line);
        }
    }
    if let Some((path, text)) = current {
        units.push(make_unit(path, text, counter));
    }

    units
}

fn make_unit(file_path: String, raw_text: String, counter: &TokenCounter) -> DiffUnit {
    let token_count = counter.count(&raw_text);
    DiffUnit {
        file_path,
        raw_text,
        token_count,
    }
}

/// Extracts the file path from the `b/` side of a `diff --git` header.
fn path_from_header(header_line: &str) -> String {
    let line = header_line.trim_end_matches('\n');
    // Use the last " b/" so paths containing spaces still resolve.
    if let Some(pos) = line.rfind(" b/") {
        line[pos + 3..].to_string()
    } else {
        line.strip_prefix(FILE_DIFF_MARKER)
            .unwrap_or(line)
            .to_string()
    }
}
