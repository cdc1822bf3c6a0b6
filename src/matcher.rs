//! Glob matching primitives used throughout the solver.
//!
//! The dialect is deliberately tiny: `*` matches any substring (including
//! the empty string and any delimiter characters), every other character
//! matches itself. A pattern with no leading `*` is anchored at the start
//! of the text; no trailing `*` anchors the end. Multiple `*` enforce
//! segment order but not adjacency.
//!
//! # Invariants
//! - Matching is byte-exact: case-insensitivity is handled upstream by
//!   canonicalizing both texts and pattern literals to lower case at ingest.
//! - The hot path performs no allocation; pattern segments are walked with
//!   a split iterator and inner searches use `memmem::find`.
//! - Worst case is `O(|pattern| * |text|)`.

use memchr::memmem;

/// Returns `true` when `pattern` matches `text` under the `*`-glob dialect.
///
/// # Examples
/// ```
/// use patternforge::matcher::matches;
///
/// assert!(matches("*cache*", "beta/cache/bank0"));
/// assert!(matches("alpha/*", "alpha/module1/mem"));
/// assert!(!matches("alpha/*", "beta/alpha/module1"));
/// assert!(matches("*mem*i0", "alpha/mem/i0"));
/// ```
pub fn matches(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return pattern == text;
    }

    let start_anchor = !pattern.starts_with('*');
    let end_anchor = !pattern.ends_with('*');
    let segment_count = pattern.split('*').filter(|s| !s.is_empty()).count();
    if segment_count == 0 {
        // Only wildcards left ("**", "***", ...): matches everything.
        return true;
    }

    let text_bytes = text.as_bytes();
    let mut pos = 0usize;
    let mut remaining = segment_count;

    for segment in pattern.split('*').filter(|s| !s.is_empty()) {
        let seg = segment.as_bytes();
        let first = remaining == segment_count;
        remaining -= 1;
        let last = remaining == 0;

        if first && start_anchor {
            if !text_bytes.starts_with(seg) {
                return false;
            }
            pos = seg.len();
            continue;
        }

        if last && end_anchor {
            // The terminal occurrence starts at `text.len() - seg.len()`,
            // which is >= any occurrence found at or after `pos`; checking
            // ends_with plus existence after `pos` is therefore sufficient.
            return text_bytes.ends_with(seg) && memmem::find(&text_bytes[pos..], seg).is_some();
        }

        match memmem::find(&text_bytes[pos..], seg) {
            Some(found) => pos += found + seg.len(),
            None => return false,
        }
    }

    // Anchored-start patterns whose only segment was the anchor ("abc*")
    // fall through here; the remaining suffix is free.
    true
}

/// Number of `*` characters in a pattern.
#[inline]
pub fn wildcard_count(pattern: &str) -> usize {
    pattern.bytes().filter(|&b| b == b'*').count()
}

/// Number of literal (non-`*`) bytes in a pattern.
#[inline]
pub fn literal_len(pattern: &str) -> usize {
    pattern.len() - wildcard_count(pattern)
}
