//! Candidate generation: a bounded, scored pool of glob patterns.
//!
//! Every emitted candidate is *sound* in the sense that it literally
//! matches at least one include item at generation time: prefix and suffix
//! forms are only emitted when the anchor token actually sits at the
//! corresponding string boundary, and exact forms only when the row's
//! tokens reconstruct the normalized string. Caps bound the pool size;
//! exceeding them degrades to truncation, never to unsound candidates.
//!
//! # Invariants
//! - Every candidate text contains at least one literal character (no bare
//!   `*`), for any input including the empty include set.
//! - Generation is reproducible bit-for-bit: iteration follows input
//!   order, deduplication keeps the first-seen kind on score ties, and
//!   retention is a stable top-k under a total order.

use ahash::AHashMap;

use crate::api::{PatternKind, SplitMethod};
use crate::matcher::{literal_len, wildcard_count};
use crate::tokens::tokenize;

/// Generation parameters for one field (or the single-field item list).
#[derive(Clone, Debug)]
pub(crate) struct GeneratorConfig {
    pub split: SplitMethod,
    pub min_token_len: usize,
    pub per_word_substrings: usize,
    pub max_multi_segments: usize,
    /// Kind gate; `None` allows every kind.
    pub allowed: Option<std::collections::BTreeSet<PatternKind>>,
    /// Score multiplier (resolved `w_field`; 1.0 in single-field mode).
    /// A multiplier of zero suppresses the field's candidates entirely.
    pub score_weight: f64,
}

/// A scored pattern candidate. Coverage masks are computed later and live
/// in a parallel array; the selector references candidates by index.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub text: String,
    pub kind: PatternKind,
    pub score: f64,
    pub wildcards: usize,
    pub length: usize,
}

/// Result of one generation run.
#[derive(Clone, Debug, Default)]
pub(crate) struct GeneratedPool {
    /// Retained candidates, best first under the total order.
    pub candidates: Vec<Candidate>,
    /// Distinct candidates before the top-k cut.
    pub generated: usize,
    /// Whether the top-k cut removed anything.
    pub truncated: bool,
}

/// Deduplicating score pool: keeps the best score per pattern text.
///
/// On a strict score improvement the kind is replaced too; ties keep the
/// first-seen kind, which follows deterministic input order.
struct ScorePool {
    entries: AHashMap<String, (PatternKind, f64)>,
}

impl ScorePool {
    fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    fn push(&mut self, text: String, kind: PatternKind, score: f64) {
        debug_assert!(literal_len(&text) > 0, "bare-wildcard candidate: {text:?}");
        match self.entries.get_mut(&text) {
            Some(entry) if score <= entry.1 => {}
            Some(entry) => *entry = (kind, score),
            None => {
                self.entries.insert(text, (kind, score));
            }
        }
    }
}

/// Generates the scored candidate pool for `items`.
///
/// Items are normalized (lower-cased) here; scores already include the
/// configured field weight. `max_candidates` bounds the retained pool.
pub(crate) fn generate(
    items: &[String],
    config: &GeneratorConfig,
    max_candidates: usize,
) -> GeneratedPool {
    let mut pool = ScorePool::new();
    if config.score_weight > 0.0 {
        let normalized: Vec<String> = items.iter().map(|s| s.to_lowercase()).collect();
        push_common_prefix(&mut pool, config, &normalized);
        for item in &normalized {
            push_item_candidates(&mut pool, config, item);
        }
    }

    let mut candidates: Vec<Candidate> = pool
        .entries
        .into_iter()
        .map(|(text, (kind, score))| {
            let wildcards = wildcard_count(&text);
            let length = literal_len(&text);
            Candidate {
                text,
                kind,
                score,
                wildcards,
                length,
            }
        })
        .collect();

    // Total order: score desc, then fewer wildcards, then longer literal
    // text, then lexicographic. Float ties never decide the output alone.
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.wildcards.cmp(&b.wildcards))
            .then_with(|| b.length.cmp(&a.length))
            .then_with(|| a.text.cmp(&b.text))
    });

    let generated = candidates.len();
    let truncated = generated > max_candidates;
    candidates.truncate(max_candidates);

    GeneratedPool {
        candidates,
        generated,
        truncated,
    }
}

/// Emits the shared-prefix candidate: the longest common prefix of all
/// items, cut back to the last delimiter boundary. This is what produces
/// `alpha/*`-style answers instead of a per-item anchor.
fn push_common_prefix(pool: &mut ScorePool, config: &GeneratorConfig, normalized: &[String]) {
    if normalized.len() < 2 || !allowed(config, PatternKind::Prefix) {
        return;
    }

    let mut common = normalized[0].as_str();
    for item in &normalized[1..] {
        let shared = common
            .bytes()
            .zip(item.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        // Clip to a character boundary; a bytewise prefix can split a
        // multi-byte character.
        let mut boundary = shared;
        while !common.is_char_boundary(boundary) {
            boundary -= 1;
        }
        common = &common[..boundary];
        if common.is_empty() {
            return;
        }
    }

    let mut last_delim_end = 0usize;
    for (offset, ch) in common.char_indices() {
        if !ch.is_alphanumeric() {
            last_delim_end = offset + ch.len_utf8();
        }
    }
    if last_delim_end == 0 {
        return;
    }

    let prefix = &common[..last_delim_end];
    let score = 2.0 * last_delim_end as f64 * config.score_weight;
    pool.push(format!("{prefix}*"), PatternKind::Prefix, score);
}

fn push_item_candidates(pool: &mut ScorePool, config: &GeneratorConfig, item: &str) {
    let min_len = match config.split {
        SplitMethod::Char => 1,
        SplitMethod::ClassChange => config.min_token_len,
    };
    let tokens = tokenize(item, config.split, min_len);
    if tokens.is_empty() {
        return;
    }
    let weight = config.score_weight;

    if allowed(config, PatternKind::Substring) {
        for token in tokens.iter().take(config.per_word_substrings) {
            let score = token.text.chars().count() as f64 * weight;
            pool.push(format!("*{}*", token.text), PatternKind::Substring, score);
        }
    }

    // Exact only when the tokens reconstruct the whole normalized string;
    // anything else could not literally match this row without wildcards.
    if allowed(config, PatternKind::Exact) {
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        if joined == item {
            let score = 2.0 * item.chars().count() as f64 * weight;
            pool.push(item.to_string(), PatternKind::Exact, score);
        }
    }

    if allowed(config, PatternKind::Prefix) {
        let first = &tokens[0].text;
        if item.starts_with(first.as_str()) {
            let score = 1.5 * first.chars().count() as f64 * weight;
            pool.push(format!("{first}*"), PatternKind::Prefix, score);
        }
    }

    if allowed(config, PatternKind::Suffix) {
        let last = &tokens[tokens.len() - 1].text;
        if item.ends_with(last.as_str()) {
            let score = 1.5 * last.chars().count() as f64 * weight;
            pool.push(format!("*{last}"), PatternKind::Suffix, score);
        }
    }

    if tokens.len() >= 2 && config.max_multi_segments >= 2 && allowed(config, PatternKind::Multi) {
        for start in 0..tokens.len() {
            let max_end = (start + config.max_multi_segments).min(tokens.len());
            for end in (start + 2)..=max_end {
                let segment = &tokens[start..end];
                let mut text = String::from("*");
                let mut literal = 0usize;
                for token in segment {
                    text.push_str(&token.text);
                    text.push('*');
                    literal += token.text.chars().count();
                }
                let score = (literal as f64 - (segment.len() - 1) as f64) * weight;
                pool.push(text, PatternKind::Multi, score);
            }
        }
    }
}

#[inline]
fn allowed(config: &GeneratorConfig, kind: PatternKind) -> bool {
    match &config.allowed {
        None => true,
        Some(set) => set.contains(&kind),
    }
}
