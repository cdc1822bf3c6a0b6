//! Coverage computation: which rows each candidate matches.
//!
//! For every surviving candidate the engine computes two bit vectors, one
//! over the include items and one over the exclude items. The selector
//! then works purely on these masks; the matcher is never consulted again
//! until witnesses are collected.
//!
//! Complexity is `O(C * (N + M))` for `C` candidates; memory is the
//! dominant cost at `C * (N + M) / 8` bytes, bounded upstream by
//! `max_candidates`.

use crate::candidates::Candidate;
use crate::matcher::matches;
use crate::stdx::DynamicBitSet;

/// Include/exclude hit masks for one candidate.
#[derive(Clone, Debug)]
pub(crate) struct CoveragePair {
    pub include: DynamicBitSet,
    pub exclude: DynamicBitSet,
}

/// Computes hit masks for one pattern over plain string items.
///
/// Items must already be normalized (lower-cased).
pub(crate) fn compute(pattern: &str, include: &[String], exclude: &[String]) -> CoveragePair {
    let mut include_bits = DynamicBitSet::empty(include.len());
    for (idx, item) in include.iter().enumerate() {
        if matches(pattern, item) {
            include_bits.set(idx);
        }
    }
    let mut exclude_bits = DynamicBitSet::empty(exclude.len());
    for (idx, item) in exclude.iter().enumerate() {
        if matches(pattern, item) {
            exclude_bits.set(idx);
        }
    }
    CoveragePair {
        include: include_bits,
        exclude: exclude_bits,
    }
}

/// Computes hit masks for every candidate over plain string items.
pub(crate) fn compute_all(
    candidates: &[Candidate],
    include: &[String],
    exclude: &[String],
) -> Vec<CoveragePair> {
    candidates
        .iter()
        .map(|candidate| compute(&candidate.text, include, exclude))
        .collect()
}

/// Computes hit masks for one pattern over a single field's values.
///
/// A `None` exclude value is a "don't care" and counts as a hit; a `None`
/// include value never matches.
pub(crate) fn compute_field(
    pattern: &str,
    include_values: &[Option<String>],
    exclude_values: &[Option<String>],
) -> CoveragePair {
    let mut include_bits = DynamicBitSet::empty(include_values.len());
    for (idx, value) in include_values.iter().enumerate() {
        if let Some(value) = value {
            if matches(pattern, value) {
                include_bits.set(idx);
            }
        }
    }
    let mut exclude_bits = DynamicBitSet::empty(exclude_values.len());
    for (idx, value) in exclude_values.iter().enumerate() {
        match value {
            Some(value) => {
                if matches(pattern, value) {
                    exclude_bits.set(idx);
                }
            }
            // Don't-care field: any pattern on this field hits the row.
            None => exclude_bits.set(idx),
        }
    }
    CoveragePair {
        include: include_bits,
        exclude: exclude_bits,
    }
}
