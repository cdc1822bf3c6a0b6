//! Post-selection refinement: replace several chosen patterns with one
//! more-general pattern when that preserves coverage and the FP budget.
//!
//! Candidate generalizations are synthesized from the covered include
//! items, not drawn from the candidate pool: the longest common prefix cut
//! at a delimiter boundary, then `*token*` forms for tokens common to all
//! covered items, then ordered token pairs `*a*b*`. The first candidate
//! whose include hits are a supercover of the current selection without
//! worsening FP wins.
//!
//! Refinement is monotone: it never increases the pattern count or FP and
//! never decreases coverage. Selections of fewer than two patterns pass
//! through untouched.

use ahash::{AHashMap, AHashSet};

use crate::api::SplitMethod;
use crate::coverage::compute;
use crate::expand::classify;
use crate::stdx::DynamicBitSet;
use crate::tokens::tokenize;

/// Cap on `*token*` generalizations probed per refinement.
const MAX_COMMON_TOKENS: usize = 5;

/// A single-pattern replacement for the whole selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Replacement {
    pub text: String,
    pub kind: crate::api::PatternKind,
}

/// Attempts to replace a multi-pattern selection with one pattern.
///
/// `current_include` is the union of the chosen patterns' include hits and
/// `current_fp` the union FP count. Returns `None` when no generalization
/// qualifies.
pub(crate) fn refine_selection(
    chosen_count: usize,
    include: &[String],
    exclude: &[String],
    current_include: &DynamicBitSet,
    current_fp: usize,
    split: SplitMethod,
    min_token_len: usize,
) -> Option<Replacement> {
    if chosen_count < 2 || current_include.is_empty() {
        return None;
    }

    let covered: Vec<&String> = current_include.iter_set().map(|idx| &include[idx]).collect();

    for text in generalizations(&covered, split, min_token_len) {
        let pair = compute(&text, include, exclude);
        if pair.include.contains_all(current_include) && pair.exclude.count() <= current_fp {
            let kind = classify(&text);
            return Some(Replacement { text, kind });
        }
    }

    None
}

/// Candidate generalization patterns for a covered-item set, in the order
/// they should be probed.
fn generalizations(covered: &[&String], split: SplitMethod, min_token_len: usize) -> Vec<String> {
    let mut out = Vec::new();

    // Longest common prefix, cut back to the last delimiter boundary.
    if covered.len() >= 2 {
        if let Some(prefix) = common_prefix_to_delimiter(covered) {
            out.push(format!("{prefix}*"));
        }
    }

    // Tokens present in every covered item, in first-appearance order.
    let common = common_tokens(covered, split, min_token_len);
    for token in common.iter().take(MAX_COMMON_TOKENS) {
        out.push(format!("*{token}*"));
    }

    // Ordered pairs of nearby common tokens.
    for i in 0..common.len() {
        for j in (i + 1)..(i + 3).min(common.len()) {
            out.push(format!("*{}*{}*", common[i], common[j]));
        }
    }

    out
}

fn common_prefix_to_delimiter(covered: &[&String]) -> Option<String> {
    let first = covered.first()?;
    let mut len = first.len();
    for item in &covered[1..] {
        let shared = first
            .bytes()
            .zip(item.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        len = len.min(shared);
    }
    if len == 0 {
        return None;
    }
    let mut boundary = len;
    while !first.is_char_boundary(boundary) {
        boundary -= 1;
    }
    let prefix = &first[..boundary];

    let mut last_delim_end = 0usize;
    for (offset, ch) in prefix.char_indices() {
        if !ch.is_alphanumeric() {
            last_delim_end = offset + ch.len_utf8();
        }
    }
    if last_delim_end == 0 {
        return None;
    }
    Some(prefix[..last_delim_end].to_string())
}

/// Tokens appearing in every covered item, ordered by first appearance.
fn common_tokens(covered: &[&String], split: SplitMethod, min_token_len: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut item_counts: AHashMap<String, usize> = AHashMap::new();

    for item in covered {
        let mut seen: AHashSet<String> = AHashSet::new();
        for token in tokenize(item, split, min_token_len) {
            // Count each token once per item.
            if !seen.insert(token.text.clone()) {
                continue;
            }
            match item_counts.get_mut(&token.text) {
                Some(count) => *count += 1,
                None => {
                    item_counts.insert(token.text.clone(), 1);
                    order.push(token.text);
                }
            }
        }
    }

    order
        .into_iter()
        .filter(|token| item_counts.get(token).copied().unwrap_or(0) == covered.len())
        .collect()
}
