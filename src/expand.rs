//! Pattern specialization: hone a chosen pattern into a longer, more
//! specific form without changing what it covers.
//!
//! For each pattern the expander takes the longest common prefix of the
//! include items it currently matches, enumerates delimiter boundaries in
//! that prefix (at most ten, longest first), and probes `prefix*`
//! candidates. The first candidate that changes the include hit mask stops
//! the walk; the longest candidate that preserves the mask without
//! increasing false positives wins.
//!
//! Wrap-around patterns (`*x*`) convert to prefix form; existing prefix
//! patterns (`x*`) extend in place. Suffix and exact patterns pass through
//! unchanged.

use crate::api::PatternKind;
use crate::coverage::compute;
use crate::matcher::literal_len;

/// Delimiters considered natural specialization boundaries.
const DELIMITERS: [char; 4] = ['/', '_', '.', '-'];

/// Cap on probed prefix positions per pattern.
const MAX_PROBES: usize = 10;

/// Attempts to specialize `pattern`; returns the (possibly unchanged) text.
///
/// Never increases false positives and never changes the include items the
/// pattern matches. Items must already be normalized.
pub(crate) fn expand_pattern(pattern: &str, include: &[String], exclude: &[String]) -> String {
    if include.is_empty() {
        return pattern.to_string();
    }

    let current = compute(pattern, include, exclude);
    if current.include.is_empty() {
        return pattern.to_string();
    }
    let current_fp = current.exclude.count();

    let covered: Vec<&String> = current.include.iter_set().map(|idx| &include[idx]).collect();
    let common_prefix = longest_common_prefix(&covered);
    if common_prefix.is_empty() {
        return pattern.to_string();
    }

    let wrap = pattern.starts_with('*') && pattern.ends_with('*');
    let anchored_prefix = !pattern.starts_with('*') && pattern.ends_with('*');
    if !wrap && !anchored_prefix {
        return pattern.to_string();
    }

    // For an already-anchored prefix, only positions extending it are
    // worth probing; the common prefix must agree with the anchor.
    let floor = if anchored_prefix {
        let anchor = &pattern[..pattern.len() - 1];
        if !common_prefix.starts_with(anchor) {
            return pattern.to_string();
        }
        anchor.len()
    } else {
        0
    };

    let mut positions: Vec<usize> = common_prefix
        .char_indices()
        .filter(|(_, ch)| DELIMITERS.contains(ch))
        .map(|(offset, ch)| offset + ch.len_utf8())
        .filter(|&pos| pos > floor)
        .collect();
    if common_prefix.len() > floor {
        positions.push(common_prefix.len());
    }
    positions.sort_unstable();
    positions.dedup();
    positions.reverse();
    positions.truncate(MAX_PROBES);

    let mut best = pattern.to_string();
    let mut best_len = literal_len(pattern);

    for pos in positions {
        let probe = format!("{}*", &common_prefix[..pos]);
        let trial = compute(&probe, include, exclude);
        // Longest-first honing: once coverage changes, shorter prefixes of
        // the same walk cannot restore it either.
        if trial.include != current.include {
            break;
        }
        let trial_fp = trial.exclude.count();
        let trial_len = literal_len(&probe);
        if trial_fp <= current_fp && trial_len > best_len {
            best = probe;
            best_len = trial_len;
            if best_len >= common_prefix.len() {
                break;
            }
        }
    }

    best
}

/// Classifies a pattern by its shape.
pub(crate) fn classify(pattern: &str) -> PatternKind {
    let wildcards = crate::matcher::wildcard_count(pattern);
    if wildcards == 0 {
        PatternKind::Exact
    } else if pattern.starts_with('*') && pattern.ends_with('*') {
        if wildcards == 2 {
            PatternKind::Substring
        } else {
            PatternKind::Multi
        }
    } else if pattern.starts_with('*') {
        PatternKind::Suffix
    } else if pattern.ends_with('*') {
        PatternKind::Prefix
    } else {
        PatternKind::Multi
    }
}

/// Longest common prefix of `items`, clipped to a character boundary.
fn longest_common_prefix(items: &[&String]) -> String {
    let Some(first) = items.first() else {
        return String::new();
    };
    let mut len = first.len();
    for item in &items[1..] {
        let shared = first
            .bytes()
            .zip(item.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        len = len.min(shared);
        if len == 0 {
            return String::new();
        }
    }
    let mut boundary = len;
    while !first.is_char_boundary(boundary) {
        boundary -= 1;
    }
    first[..boundary].to_string()
}
