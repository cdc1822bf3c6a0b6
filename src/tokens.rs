//! Tokenization of hierarchical strings into indexed tokens.
//!
//! Splitting is deterministic and delimiter-aware. Under `classchange`,
//! boundaries fall on transitions between alphabetic, digit, and other
//! character classes; under `char`, every character is its own token and
//! the minimum token length is forced to 1.
//!
//! # Invariants
//! - Token text is lower-cased and non-empty.
//! - Tokens are emitted in ascending original-index order; duplicate texts
//!   are allowed (they carry different indices).
//! - A merged token's text occurs verbatim in the normalized source string:
//!   sub-minimum tokens absorb the delimiter characters between themselves
//!   and the next kept token. This is what makes later prefix/suffix/multi
//!   candidates actually matchable.

use crate::api::SplitMethod;

/// A normalized token plus its position among the raw splits.
///
/// `index` is the raw-split position of the first contributing character
/// run; it is used to keep multi-segment patterns in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Lower-cased token text; occurs verbatim in the normalized source.
    pub text: String,
    /// Position among the raw splits (not a byte offset).
    pub index: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Alpha,
    Digit,
    Other,
}

fn class_of(ch: char) -> CharClass {
    if ch.is_alphabetic() {
        CharClass::Alpha
    } else if ch.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Other
    }
}

/// Byte span of a kept raw token within the normalized string.
struct RawSpan {
    start: usize,
    end: usize,
    index: usize,
    chars: usize,
}

/// Lower-cases `text` and splits it into tokens.
///
/// `min_token_len` must be at least 1 (validated upstream); it is ignored
/// under [`SplitMethod::Char`], which forces a minimum of 1.
pub fn tokenize(text: &str, method: SplitMethod, min_token_len: usize) -> Vec<Token> {
    let normalized = text.to_lowercase();
    match method {
        SplitMethod::Char => normalized
            .char_indices()
            .enumerate()
            .map(|(index, (start, ch))| Token {
                text: normalized[start..start + ch.len_utf8()].to_string(),
                index,
            })
            .collect(),
        SplitMethod::ClassChange => tokenize_classchange(&normalized, min_token_len),
    }
}

fn tokenize_classchange(normalized: &str, min_token_len: usize) -> Vec<Token> {
    // Raw split on class transitions, keeping byte spans.
    let mut spans: Vec<RawSpan> = Vec::new();
    let mut run_start = 0usize;
    let mut run_chars = 0usize;
    let mut run_class: Option<CharClass> = None;
    let mut raw_index = 0usize;

    for (offset, ch) in normalized.char_indices() {
        let class = class_of(ch);
        match run_class {
            Some(current) if current == class => {
                run_chars += 1;
            }
            Some(_) => {
                spans.push(RawSpan {
                    start: run_start,
                    end: offset,
                    index: raw_index,
                    chars: run_chars,
                });
                raw_index += 1;
                run_start = offset;
                run_chars = 1;
                run_class = Some(class);
            }
            None => {
                run_start = offset;
                run_chars = 1;
                run_class = Some(class);
            }
        }
    }
    if run_class.is_some() {
        spans.push(RawSpan {
            start: run_start,
            end: normalized.len(),
            index: raw_index,
            chars: run_chars,
        });
    }

    // Single-character raw tokens (typically the delimiters themselves) are
    // dropped; the merge step below re-absorbs them as literal delimiter
    // text between kept tokens.
    spans.retain(|span| span.chars > 1);

    // Merge sub-minimum tokens into the next kept token, spanning the
    // intervening delimiter characters. A trailing sub-minimum token with
    // no successor is dropped.
    let mut merged: Vec<RawSpan> = Vec::new();
    let mut pending: Option<RawSpan> = None;
    for span in spans {
        let span = match pending.take() {
            Some(prev) => {
                let start = prev.start;
                RawSpan {
                    start,
                    end: span.end,
                    index: prev.index,
                    chars: normalized[start..span.end].chars().count(),
                }
            }
            None => span,
        };
        if span.chars < min_token_len {
            pending = Some(span);
        } else {
            merged.push(span);
        }
    }

    merged
        .into_iter()
        .map(|span| Token {
            text: normalized[span.start..span.end].to_string(),
            index: span.index,
        })
        .collect()
}
