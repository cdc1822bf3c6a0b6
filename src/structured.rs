//! Structured (multi-field) solving: disjunctions of per-field
//! conjunctions.
//!
//! The approach is pattern-centric and scales linearly in the row count:
//! candidates are generated per field, coverage is computed at row level,
//! and a greedy set-cover builds one expression at a time. An expression
//! starts from the single-field pattern of best projected cost and is then
//! lazily specialized: one extra field's pattern may be AND-ed in, but only
//! when doing so strictly reduces the expression's false positives without
//! reducing its true positives, and at most one pattern per field.
//!
//! # Invariants
//! - Every selected pattern carries a field and is matched only against
//!   that field's value.
//! - A `null` exclude field is "don't care": any pattern on that field
//!   hits the row. A `null` include field never matches.
//! - All rows must share the field set detected from the first row.

use std::collections::BTreeMap;

use crate::api::{
    ConfigError, Effort, InputError, Metrics, Pattern, Solution, SolveError, SolveOptions,
    SplitMethod, Term, Witnesses, DEFAULT_MIN_TOKEN_LEN,
};
use crate::candidates::{generate, GeneratorConfig};
use crate::coverage::{compute_field, CoveragePair};
use crate::diag::{SolveDiagnostics, Stage};
use crate::select::{CostParams, ResolvedBudgets};
use crate::solver::{with_exact_fp, WITNESS_LIMIT};
use crate::stdx::DynamicBitSet;

/// One structured row: field name to value, `None` meaning "don't care"
/// on exclude rows.
pub type Row = BTreeMap<String, Option<String>>;

/// A field-tagged candidate with row-level coverage.
struct FieldCandidate {
    field: usize,
    text: String,
    score: f64,
    wildcards: usize,
    length: usize,
    coverage: CoveragePair,
}

/// An expression under construction or selected: a conjunction of one
/// pattern per field.
struct Expression {
    /// `(field index, candidate index)` in insertion order; seed first.
    members: Vec<(usize, usize)>,
    include_mask: DynamicBitSet,
    exclude_mask: DynamicBitSet,
}

/// Discovers a disjunction of per-field conjunctions separating
/// `include_rows` from `exclude_rows`.
///
/// # Errors
/// [`SolveError::Input`] when rows disagree on the field set;
/// [`SolveError::Config`] for invalid options.
pub fn solve_structured(
    include_rows: &[Row],
    exclude_rows: &[Row],
    options: &SolveOptions,
) -> Result<Solution, SolveError> {
    options.validate()?;

    let field_names = detect_fields(include_rows, exclude_rows);
    validate_rows(include_rows, exclude_rows, &field_names)?;

    let n = include_rows.len();
    let m = exclude_rows.len();
    if options.effort == Effort::Exhaustive && (n >= 100 || field_names.len() >= 5) {
        return Err(ConfigError::ExhaustiveTooLarge {
            rows: n,
            fields: field_names.len(),
        }
        .into());
    }

    let options = with_exact_fp(options);
    let budgets = ResolvedBudgets::resolve(&options.budgets, n)?;

    // Per-field normalized value columns.
    let include_values = columns(include_rows, &field_names);
    let exclude_values = columns(exclude_rows, &field_names);

    let (candidates, diagnostics) =
        build_candidates(&options, &field_names, &include_values, &exclude_values);

    let expressions = select_expressions(&options, &budgets, &candidates, &field_names, n, m);

    Ok(assemble(
        &field_names,
        &candidates,
        &expressions,
        include_rows,
        exclude_rows,
        diagnostics,
    ))
}

/// Field set detected from the first row; empty when there are no rows.
fn detect_fields(include_rows: &[Row], exclude_rows: &[Row]) -> Vec<String> {
    include_rows
        .first()
        .or_else(|| exclude_rows.first())
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

fn validate_rows(
    include_rows: &[Row],
    exclude_rows: &[Row],
    field_names: &[String],
) -> Result<(), InputError> {
    for (row_idx, row) in include_rows.iter().chain(exclude_rows).enumerate() {
        let keys: Vec<&String> = row.keys().collect();
        let expected: Vec<&String> = field_names.iter().collect();
        if keys != expected {
            return Err(InputError::FieldMismatch {
                row: row_idx,
                detail: format!(
                    "expected fields {:?}, got {:?}",
                    field_names,
                    row.keys().collect::<Vec<_>>()
                ),
            });
        }
    }
    Ok(())
}

/// Per-field normalized value columns, indexed `[field][row]`.
fn columns(rows: &[Row], field_names: &[String]) -> Vec<Vec<Option<String>>> {
    field_names
        .iter()
        .map(|name| {
            rows.iter()
                .map(|row| {
                    row.get(name)
                        .and_then(|v| v.as_ref())
                        .map(|v| v.to_lowercase())
                })
                .collect()
        })
        .collect()
}

/// Runs the per-field generators and computes row-level coverage.
fn build_candidates(
    options: &SolveOptions,
    field_names: &[String],
    include_values: &[Vec<Option<String>>],
    exclude_values: &[Vec<Option<String>>],
) -> (Vec<FieldCandidate>, SolveDiagnostics) {
    let per_field_cap = options.effort.patterns_per_field();
    let mut all: Vec<FieldCandidate> = Vec::new();
    let mut generated_total = 0usize;
    let mut truncated = false;

    for (field_idx, name) in field_names.iter().enumerate() {
        let weight = options
            .weights
            .w_field
            .as_ref()
            .and_then(|map| map.get(name).copied())
            .unwrap_or(1.0);
        let config = GeneratorConfig {
            split: options
                .splitmethod
                .resolve(Some(name), SplitMethod::ClassChange),
            min_token_len: options
                .min_token_len
                .resolve(Some(name), DEFAULT_MIN_TOKEN_LEN),
            per_word_substrings: options.per_word_substrings,
            max_multi_segments: options.max_multi_segments,
            allowed: options.allowed_patterns.clone(),
            score_weight: weight,
        };

        let items: Vec<String> = include_values[field_idx]
            .iter()
            .filter_map(|v| v.clone())
            .collect();
        let pool = generate(&items, &config, per_field_cap);
        generated_total += pool.generated;
        truncated |= pool.truncated;

        for candidate in pool.candidates {
            let coverage = compute_field(
                &candidate.text,
                &include_values[field_idx],
                &exclude_values[field_idx],
            );
            // Patterns that hit no include row can never help a cover.
            if coverage.include.is_empty() {
                continue;
            }
            all.push(FieldCandidate {
                field: field_idx,
                text: candidate.text,
                score: candidate.score,
                wildcards: candidate.wildcards,
                length: candidate.length,
                coverage,
            });
        }
    }

    // Global retention under the same total order, with the field name as
    // the final tiebreaker.
    all.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.wildcards.cmp(&b.wildcards))
            .then_with(|| b.length.cmp(&a.length))
            .then_with(|| a.text.cmp(&b.text))
            .then_with(|| field_names[a.field].cmp(&field_names[b.field]))
    });
    if all.len() > options.budgets.max_candidates {
        truncated = true;
        all.truncate(options.budgets.max_candidates);
    }

    let diagnostics = SolveDiagnostics {
        candidates_generated: generated_total,
        candidates_retained: all.len(),
        truncated,
        stage: Stage::Finalized,
    };
    (all, diagnostics)
}

/// Greedy expression construction with lazy multi-field specialization.
fn select_expressions(
    options: &SolveOptions,
    budgets: &ResolvedBudgets,
    candidates: &[FieldCandidate],
    field_names: &[String],
    n: usize,
    m: usize,
) -> Vec<Expression> {
    let multi_field = options.effort.multi_field();
    let mut expressions: Vec<Expression> = Vec::new();
    let mut covered = DynamicBitSet::empty(n);
    let mut fp_mask = DynamicBitSet::empty(m);
    let mut chosen_fields: Vec<Option<String>> = Vec::new();
    let mut total_wildcards = 0usize;
    let mut total_length = 0usize;

    let mut current_cost = {
        let params = CostParams::for_fields(&options.weights, &[]);
        params.cost(n, 0, 0, 0, 0, 0)
    };

    loop {
        if covered.is_full() && fp_mask.is_empty() {
            break;
        }
        if budgets
            .max_patterns
            .is_some_and(|max| chosen_fields.len() >= max)
        {
            break;
        }

        // Rank seeds by projected single-pattern cost.
        let mut seeds: Vec<(f64, usize)> = Vec::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            if candidate.coverage.include.andnot_count(&covered) == 0 {
                continue;
            }
            let trial_fields = fields_with(&chosen_fields, &field_names[candidate.field]);
            let params = CostParams::for_fields(&options.weights, &trial_fields);
            let cost = params.cost(
                n,
                covered.union_count(&candidate.coverage.include),
                fp_mask.union_count(&candidate.coverage.exclude),
                chosen_fields.len() + 1,
                total_wildcards + candidate.wildcards,
                total_length + candidate.length,
            );
            seeds.push((cost, idx));
        }
        seeds.sort_by(|a, b| {
            a.0.total_cmp(&b.0).then_with(|| {
                let ca = &candidates[a.1];
                let cb = &candidates[b.1];
                ca.wildcards
                    .cmp(&cb.wildcards)
                    .then_with(|| cb.length.cmp(&ca.length))
                    .then_with(|| ca.text.cmp(&cb.text))
                    .then_with(|| field_names[ca.field].cmp(&field_names[cb.field]))
            })
        });

        let mut accepted = false;
        for &(_, seed_idx) in &seeds {
            let expr = specialize(seed_idx, candidates, multi_field);

            let fp_union = fp_mask.union_count(&expr.exclude_mask);
            if budgets.max_fp.is_some_and(|max| fp_union > max) {
                continue;
            }
            let covered_union = covered.union_count(&expr.include_mask);
            if budgets.max_fn.is_some_and(|max| n - covered_union > max) {
                continue;
            }
            if budgets
                .max_patterns
                .is_some_and(|max| chosen_fields.len() + expr.members.len() > max)
            {
                continue;
            }

            let mut trial_fields = chosen_fields.clone();
            let mut trial_wc = total_wildcards;
            let mut trial_len = total_length;
            for &(field_idx, cand_idx) in &expr.members {
                trial_fields.push(Some(field_names[field_idx].clone()));
                trial_wc += candidates[cand_idx].wildcards;
                trial_len += candidates[cand_idx].length;
            }
            let field_refs: Vec<Option<&str>> =
                trial_fields.iter().map(|f| f.as_deref()).collect();
            let params = CostParams::for_fields(&options.weights, &field_refs);
            let trial_cost = params.cost(
                n,
                covered_union,
                fp_union,
                trial_fields.len(),
                trial_wc,
                trial_len,
            );
            if trial_cost < current_cost {
                covered.union_with(&expr.include_mask);
                fp_mask.union_with(&expr.exclude_mask);
                chosen_fields = trial_fields;
                total_wildcards = trial_wc;
                total_length = trial_len;
                current_cost = trial_cost;
                expressions.push(expr);
                accepted = true;
                break;
            }
        }

        if !accepted {
            break;
        }
    }

    expressions
}

fn fields_with<'a>(chosen: &'a [Option<String>], extra: &'a str) -> Vec<Option<&'a str>> {
    let mut fields: Vec<Option<&str>> = chosen.iter().map(|f| f.as_deref()).collect();
    fields.push(Some(extra));
    fields
}

/// Builds an expression from a seed candidate, lazily AND-ing in at most
/// one pattern per additional field while each addition strictly reduces
/// false positives without reducing true positives.
fn specialize(seed_idx: usize, candidates: &[FieldCandidate], multi_field: bool) -> Expression {
    let seed = &candidates[seed_idx];
    let mut expr = Expression {
        members: vec![(seed.field, seed_idx)],
        include_mask: seed.coverage.include.clone(),
        exclude_mask: seed.coverage.exclude.clone(),
    };
    if !multi_field {
        return expr;
    }

    loop {
        let current_fp = expr.exclude_mask.count();
        if current_fp == 0 {
            break;
        }
        let mut best: Option<(usize, usize)> = None;
        let mut best_fp = current_fp;
        for (idx, candidate) in candidates.iter().enumerate() {
            if expr.members.iter().any(|&(field, _)| field == candidate.field) {
                continue;
            }
            if !candidate.coverage.include.contains_all(&expr.include_mask) {
                continue;
            }
            let fp = expr.exclude_mask.intersect_count(&candidate.coverage.exclude);
            // Strict FP reduction required; ties resolved by pool order,
            // which is already the deterministic total order.
            if fp < best_fp {
                best_fp = fp;
                best = Some((candidate.field, idx));
            }
        }
        match best {
            Some((field, idx)) => {
                expr.include_mask
                    .intersect_with(&candidates[idx].coverage.include);
                expr.exclude_mask
                    .intersect_with(&candidates[idx].coverage.exclude);
                expr.members.push((field, idx));
            }
            None => break,
        }
    }

    expr
}

fn assemble(
    field_names: &[String],
    candidates: &[FieldCandidate],
    expressions: &[Expression],
    include_rows: &[Row],
    exclude_rows: &[Row],
    diagnostics: SolveDiagnostics,
) -> Solution {
    let n = include_rows.len();
    let m = exclude_rows.len();

    let mut covered = DynamicBitSet::empty(n);
    let mut fp_mask = DynamicBitSet::empty(m);

    let mut patterns: Vec<Pattern> = Vec::new();
    let mut terms: Vec<Term> = Vec::new();
    let mut expr_parts: Vec<String> = Vec::new();
    let mut raw_parts: Vec<String> = Vec::new();

    for expression in expressions {
        let mut fields = BTreeMap::new();
        let mut symbolic = Vec::new();
        let mut raw = Vec::new();
        let mut length = 0usize;

        for &(field_idx, cand_idx) in &expression.members {
            let candidate = &candidates[cand_idx];
            let field_name = &field_names[field_idx];
            let id = format!("P{}", patterns.len() + 1);
            symbolic.push(format!("({field_name}: {id})"));
            raw.push(format!("({field_name}: {})", candidate.text));
            fields.insert(field_name.clone(), candidate.text.clone());
            length += candidate.length;
            patterns.push(Pattern {
                id,
                text: candidate.text.clone(),
                kind: crate::expand::classify(&candidate.text),
                wildcards: candidate.wildcards,
                length: candidate.length,
                field: Some(field_name.clone()),
                matches: Some(candidate.coverage.include.count()),
                fp: Some(candidate.coverage.exclude.count()),
            });
        }

        let matches = expression.include_mask.count();
        let fp = expression.exclude_mask.count();
        let incremental_matches = expression.include_mask.andnot_count(&covered);
        let incremental_fp = expression.exclude_mask.andnot_count(&fp_mask);
        covered.union_with(&expression.include_mask);
        fp_mask.union_with(&expression.exclude_mask);

        terms.push(Term {
            fields,
            matches,
            fp,
            fn_: n - matches,
            incremental_matches,
            incremental_fp,
            length,
        });
        expr_parts.push(symbolic.join(" & "));
        raw_parts.push(raw.join(" & "));
    }

    let expr = if expr_parts.is_empty() {
        "FALSE".to_string()
    } else {
        expr_parts.join(" | ")
    };
    let raw_expr = if raw_parts.is_empty() {
        "FALSE".to_string()
    } else {
        raw_parts.join(" | ")
    };

    let metrics = Metrics {
        covered: covered.count(),
        total_positive: n,
        fp: fp_mask.count(),
        fn_: n - covered.count(),
        total_negative: m,
        patterns: patterns.len(),
        boolean_ops: patterns.len().saturating_sub(1),
        wildcards: patterns.iter().map(|p| p.wildcards).sum(),
        pattern_chars: patterns.iter().map(|p| p.length).sum(),
    };

    let witnesses = Witnesses {
        tp_examples: sample_rows(include_rows, field_names, &covered, true),
        fp_examples: sample_rows(exclude_rows, field_names, &fp_mask, true),
        fn_examples: sample_rows(include_rows, field_names, &covered, false),
    };

    Solution {
        expr,
        raw_expr,
        patterns,
        metrics,
        witnesses,
        global_inverted: false,
        terms: Some(terms),
        diagnostics,
    }
}

/// Canonical display string for a row: present values joined with `/`.
fn canonical_row(row: &Row, field_names: &[String]) -> String {
    let parts: Vec<&str> = field_names
        .iter()
        .filter_map(|name| row.get(name).and_then(|v| v.as_deref()))
        .collect();
    parts.join("/")
}

fn sample_rows(
    rows: &[Row],
    field_names: &[String],
    mask: &DynamicBitSet,
    hit: bool,
) -> Vec<String> {
    rows.iter()
        .enumerate()
        .filter(|(idx, _)| mask.is_set(*idx) == hit)
        .take(WITNESS_LIMIT)
        .map(|(_, row)| canonical_row(row, field_names))
        .collect()
}
