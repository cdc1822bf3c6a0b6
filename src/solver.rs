//! Pipeline orchestration for single-field solves.
//!
//! The lifecycle is linear: options are validated up front, then
//! `Tokenized -> CandidatesScored -> Selected -> Expanded -> Refined ->
//! Finalized`. The only non-linear branch is the inversion check after
//! selection, which may swap the chosen set for the complement solution
//! before expansion runs.
//!
//! # Invariants
//! - `EXACT` mode forces `max_fp = 0`; the returned solution either
//!   respects it or is empty (`covered = 0`), which is success.
//! - An empty include set yields an empty solution, never `*`.
//! - The inverted solution is only returned when it satisfies the FP
//!   budget and selected at least one pattern; otherwise the base
//!   selection wins.

use crate::api::{
    InvertStrategy, Limit, Metrics, Pattern, QualityMode, Solution, SolveError, SolveOptions,
    SplitMethod, Witnesses, DEFAULT_MIN_TOKEN_LEN,
};
use crate::candidates::{generate, GeneratedPool, GeneratorConfig};
use crate::coverage::{compute, compute_all, CoveragePair};
use crate::diag::{SolveDiagnostics, Stage};
use crate::expand::{classify, expand_pattern};
use crate::matcher::{literal_len, wildcard_count};
use crate::refine::refine_selection;
use crate::select::{greedy_select, CostParams, ResolvedBudgets, Selection};
use crate::stdx::DynamicBitSet;

/// Number of example items retained per witness category.
pub(crate) const WITNESS_LIMIT: usize = 3;

/// A chosen pattern carried through expansion and refinement.
#[derive(Clone, Debug)]
struct ChosenPattern {
    text: String,
    kind: crate::api::PatternKind,
    coverage: CoveragePair,
}

/// One oriented selection run: generation, coverage, greedy selection.
struct OrientedRun {
    selection: Selection,
    pool: GeneratedPool,
    coverage: Vec<CoveragePair>,
}

/// Discovers a disjunction of glob patterns matching `include` but not
/// `exclude`.
///
/// Items are canonicalized to lower case internally; the returned pattern
/// texts are in canonical form.
///
/// # Errors
/// Returns a [`SolveError`] for invalid configuration or malformed input.
/// An unsolvable instance is *not* an error: it yields an empty solution
/// with `covered = 0`.
pub fn solve(
    include: &[String],
    exclude: &[String],
    options: &SolveOptions,
) -> Result<Solution, SolveError> {
    options.validate()?;
    if options.effort == crate::api::Effort::Exhaustive && include.len() >= 100 {
        return Err(crate::api::ConfigError::ExhaustiveTooLarge {
            rows: include.len(),
            fields: 1,
        }
        .into());
    }

    let options = with_exact_fp(options);
    let include_norm: Vec<String> = include.iter().map(|s| s.to_lowercase()).collect();
    let exclude_norm: Vec<String> = exclude.iter().map(|s| s.to_lowercase()).collect();
    let n = include_norm.len();
    let m = exclude_norm.len();

    let budgets = ResolvedBudgets::resolve(&options.budgets, n)?;
    let params = CostParams::for_single_field(&options.weights);

    let base = run_oriented(&include_norm, &exclude_norm, &options, &budgets, &params);

    // Inversion branch: solve the symmetric instance (roles swapped) and
    // keep whichever orientation wins. The FP check on the inverted result
    // is mandatory for both `always` and `auto`.
    let mut inverted = false;
    let run = if options.invert == InvertStrategy::Never || n == 0 {
        base
    } else {
        let swapped_budgets = ResolvedBudgets {
            max_patterns: budgets.max_patterns,
            // Sub-solve FP hits original includes, which become FNs of the
            // negated solution. FP grows monotonically, so per-step
            // enforcement is exact. The final-FP constraint (unmatched
            // excludes) shrinks as coverage grows and is checked once on
            // the finished sub-selection below.
            max_fp: budgets.max_fn,
            max_fn: None,
        };
        let inv = run_oriented(&exclude_norm, &include_norm, &options, &swapped_budgets, &params);

        let inv_final_fp = m - inv.selection.covered();
        let inv_admissible = !inv.selection.chosen.is_empty()
            && budgets.max_fp.map_or(true, |max| inv_final_fp <= max);

        let base_cost = params.cost(
            n,
            base.selection.covered(),
            base.selection.fp(),
            base.selection.chosen.len(),
            base.selection.wildcards,
            base.selection.length,
        );
        let inv_cost = params.cost(
            n,
            n - inv.selection.fp(),
            inv_final_fp,
            inv.selection.chosen.len(),
            inv.selection.wildcards,
            inv.selection.length,
        );

        let take_inverted = match options.invert {
            InvertStrategy::Never => false,
            InvertStrategy::Always => inv_admissible,
            InvertStrategy::Auto => inv_admissible && inv_cost < base_cost,
        };
        if take_inverted {
            inverted = true;
            inv
        } else {
            base
        }
    };

    // From here on, work in the winning orientation.
    let (oriented_include, oriented_exclude) = if inverted {
        (&exclude_norm, &include_norm)
    } else {
        (&include_norm, &exclude_norm)
    };

    let mut chosen: Vec<ChosenPattern> = run
        .selection
        .chosen
        .iter()
        .map(|&idx| ChosenPattern {
            text: run.pool.candidates[idx].text.clone(),
            kind: run.pool.candidates[idx].kind,
            coverage: run.coverage[idx].clone(),
        })
        .collect();

    // Expanded: specialize each pattern without changing its include
    // coverage. A specialization is kept only when it strictly reduces
    // the pattern's FP count; at equal FP the longer text just costs more
    // under `w_len` and is discarded.
    for pattern in &mut chosen {
        let expanded = expand_pattern(&pattern.text, oriented_include, oriented_exclude);
        if expanded != pattern.text {
            let coverage = compute(&expanded, oriented_include, oriented_exclude);
            debug_assert_eq!(coverage.include, pattern.coverage.include);
            if coverage.exclude.count() < pattern.coverage.exclude.count() {
                pattern.coverage = coverage;
                pattern.kind = classify(&expanded);
                pattern.text = expanded;
            }
        }
    }

    // Refined: collapse the selection into one more-general pattern when
    // coverage and the FP budget allow it.
    let (union_include, union_exclude) =
        union_masks(&chosen, oriented_include.len(), oriented_exclude.len());
    let split = options.splitmethod.resolve(None, SplitMethod::ClassChange);
    let min_token_len = options.min_token_len.resolve(None, DEFAULT_MIN_TOKEN_LEN);
    if let Some(replacement) = refine_selection(
        chosen.len(),
        oriented_include,
        oriented_exclude,
        &union_include,
        union_exclude.count(),
        split,
        min_token_len,
    ) {
        let coverage = compute(&replacement.text, oriented_include, oriented_exclude);
        chosen = vec![ChosenPattern {
            text: replacement.text,
            kind: replacement.kind,
            coverage,
        }];
    }

    let diagnostics = SolveDiagnostics {
        candidates_generated: run.pool.generated,
        candidates_retained: run.pool.candidates.len(),
        truncated: run.pool.truncated,
        stage: Stage::Finalized,
    };

    Ok(assemble(
        &chosen,
        &include_norm,
        &exclude_norm,
        inverted,
        diagnostics,
    ))
}

/// Applies the `EXACT` shorthand: force `max_fp = 0` when unset.
pub(crate) fn with_exact_fp(options: &SolveOptions) -> SolveOptions {
    let mut options = options.clone();
    if options.mode == QualityMode::Exact && options.budgets.max_fp.is_none() {
        options.budgets.max_fp = Some(Limit::Count(0));
    }
    options
}

fn run_oriented(
    include: &[String],
    exclude: &[String],
    options: &SolveOptions,
    budgets: &ResolvedBudgets,
    params: &CostParams,
) -> OrientedRun {
    let config = GeneratorConfig {
        split: options.splitmethod.resolve(None, SplitMethod::ClassChange),
        min_token_len: options.min_token_len.resolve(None, DEFAULT_MIN_TOKEN_LEN),
        per_word_substrings: options.per_word_substrings,
        max_multi_segments: options.max_multi_segments,
        allowed: options.allowed_patterns.clone(),
        score_weight: 1.0,
    };
    let pool = generate(include, &config, options.budgets.max_candidates);
    let coverage = compute_all(&pool.candidates, include, exclude);
    let selection = greedy_select(&pool.candidates, &coverage, include.len(), params, budgets);
    OrientedRun {
        selection,
        pool,
        coverage,
    }
}

fn union_masks(
    chosen: &[ChosenPattern],
    n_include: usize,
    n_exclude: usize,
) -> (DynamicBitSet, DynamicBitSet) {
    let mut include_bits = DynamicBitSet::empty(n_include);
    let mut exclude_bits = DynamicBitSet::empty(n_exclude);
    for pattern in chosen {
        include_bits.union_with(&pattern.coverage.include);
        exclude_bits.union_with(&pattern.coverage.exclude);
    }
    (include_bits, exclude_bits)
}

/// Builds the final [`Solution`] from the finished pattern set.
///
/// In an inverted solution the patterns were solved against the exclude
/// set; metrics and witnesses map through the negation.
fn assemble(
    chosen: &[ChosenPattern],
    include: &[String],
    exclude: &[String],
    inverted: bool,
    diagnostics: SolveDiagnostics,
) -> Solution {
    let n = include.len();
    let m = exclude.len();

    // Masks over the ORIGINAL include/exclude sets of the items matched by
    // the pattern disjunction itself (pre-negation).
    let mut include_hits = DynamicBitSet::empty(n);
    let mut exclude_hits = DynamicBitSet::empty(m);
    for pattern in chosen {
        if inverted {
            // Oriented include = original exclude, and vice versa.
            exclude_hits.union_with(&pattern.coverage.include);
            include_hits.union_with(&pattern.coverage.exclude);
        } else {
            include_hits.union_with(&pattern.coverage.include);
            exclude_hits.union_with(&pattern.coverage.exclude);
        }
    }

    let (covered, fp) = if inverted {
        (n - include_hits.count(), m - exclude_hits.count())
    } else {
        (include_hits.count(), exclude_hits.count())
    };

    let patterns: Vec<Pattern> = chosen
        .iter()
        .enumerate()
        .map(|(idx, pattern)| Pattern {
            id: format!("P{}", idx + 1),
            text: pattern.text.clone(),
            kind: pattern.kind,
            wildcards: wildcard_count(&pattern.text),
            length: literal_len(&pattern.text),
            field: None,
            matches: Some(pattern.coverage.include.count()),
            fp: Some(pattern.coverage.exclude.count()),
        })
        .collect();

    let expr = if patterns.is_empty() {
        "FALSE".to_string()
    } else {
        patterns
            .iter()
            .map(|p| p.id.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    };
    let raw_expr = if patterns.is_empty() {
        "FALSE".to_string()
    } else {
        patterns
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let metrics = Metrics {
        covered,
        total_positive: n,
        fp,
        fn_: n - covered,
        total_negative: m,
        patterns: patterns.len(),
        boolean_ops: patterns.len().saturating_sub(1),
        wildcards: patterns.iter().map(|p| p.wildcards).sum(),
        pattern_chars: patterns.iter().map(|p| p.length).sum(),
    };

    // A TP is an include item the final predicate matches; under
    // inversion the final predicate is the negation of the disjunction.
    let tp_examples = sample(include, &include_hits, !inverted);
    let fp_examples = sample(exclude, &exclude_hits, !inverted);
    let fn_examples = sample(include, &include_hits, inverted);

    Solution {
        expr,
        raw_expr,
        patterns,
        metrics,
        witnesses: Witnesses {
            tp_examples,
            fp_examples,
            fn_examples,
        },
        global_inverted: inverted,
        terms: None,
        diagnostics,
    }
}

/// First few items whose hit bit equals `hit`.
fn sample(items: &[String], hits: &DynamicBitSet, hit: bool) -> Vec<String> {
    // Empty selections match nothing; an inverted empty selection would
    // match everything, but empty selections are never returned inverted.
    items
        .iter()
        .enumerate()
        .filter(|(idx, _)| hits.is_set(*idx) == hit)
        .take(WITNESS_LIMIT)
        .map(|(_, item)| item.clone())
        .collect()
}
