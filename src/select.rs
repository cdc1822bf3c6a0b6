//! Greedy cost-driven selection over the candidate pool.
//!
//! Set-cover with soft weights and hard budgets. Each round projects the
//! cost of every remaining candidate union'd into the current selection,
//! rejects candidates that would violate a hard budget, and appends the
//! cheapest one. Selection stops as soon as the cover is perfect, no
//! candidate strictly lowers the cost, or the pattern budget is reached.
//!
//! # Invariants
//! - Patterns are appended, never replaced, during selection.
//! - The hot loop allocates nothing: hypothetical unions use the bitset's
//!   projected counts.
//! - All comparisons end in structural tiebreakers (gain, wildcards,
//!   length, text), so float ties never make the output nondeterministic.

use crate::api::{Budgets, ConfigError, Weights};
use crate::candidates::Candidate;
use crate::coverage::CoveragePair;
use crate::stdx::DynamicBitSet;

/// Hard budgets resolved to absolute counts against the include size.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ResolvedBudgets {
    pub max_patterns: Option<usize>,
    pub max_fp: Option<usize>,
    pub max_fn: Option<usize>,
}

impl ResolvedBudgets {
    /// Resolves fractions against `n_include` and rejects combinations
    /// that cannot be satisfied on this input.
    pub fn resolve(budgets: &Budgets, n_include: usize) -> Result<Self, ConfigError> {
        let resolved = Self {
            max_patterns: budgets.max_patterns.map(|l| l.resolve(n_include)),
            max_fp: budgets.max_fp.map(|l| l.resolve(n_include)),
            max_fn: budgets.max_fn.map(|l| l.resolve(n_include)),
        };
        if n_include > 0 && resolved.max_patterns == Some(0) && resolved.max_fn == Some(0) {
            return Err(ConfigError::ContradictoryBudgets {
                detail: "max_patterns=0 with max_fn=0 cannot cover a non-empty include set"
                    .to_string(),
            });
        }
        Ok(resolved)
    }
}

/// Scalar cost weights after per-field resolution.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CostParams {
    pub w_fp: f64,
    pub w_fn: f64,
    pub w_pattern: f64,
    pub w_op: f64,
    pub w_wc: f64,
    pub w_len: f64,
}

impl CostParams {
    /// Resolves weights for the single-field path (no field context).
    pub fn for_single_field(weights: &Weights) -> Self {
        Self {
            w_fp: weights.w_fp.resolve(None, 1.0),
            w_fn: weights.w_fn.resolve(None, 1.0),
            w_pattern: weights.w_pattern.resolve(None, 0.05),
            w_op: weights.w_op.resolve(None, 0.02),
            w_wc: weights.w_wc.resolve(None, 0.01),
            w_len: weights.w_len.resolve(None, 0.001),
        }
    }

    /// Resolves weights against a set of chosen-pattern fields: per-field
    /// weights contribute by the fraction of chosen patterns on that field.
    pub fn for_fields(weights: &Weights, fields: &[Option<&str>]) -> Self {
        let frac = |weight: &crate::api::Weight, default: f64| -> f64 {
            if fields.is_empty() {
                weight.resolve(None, default)
            } else {
                fields
                    .iter()
                    .map(|field| weight.resolve(field.as_deref(), default))
                    .sum::<f64>()
                    / fields.len() as f64
            }
        };
        Self {
            w_fp: frac(&weights.w_fp, 1.0),
            w_fn: frac(&weights.w_fn, 1.0),
            w_pattern: frac(&weights.w_pattern, 0.05),
            w_op: frac(&weights.w_op, 0.02),
            w_wc: frac(&weights.w_wc, 0.01),
            w_len: frac(&weights.w_len, 0.001),
        }
    }

    /// The cost of a selection summarized by its aggregates.
    pub fn cost(
        &self,
        n_include: usize,
        covered: usize,
        fp: usize,
        patterns: usize,
        wildcards: usize,
        length: usize,
    ) -> f64 {
        let fn_count = n_include - covered;
        let ops = patterns.saturating_sub(1);
        self.w_fp * fp as f64
            + self.w_fn * fn_count as f64
            + self.w_pattern * patterns as f64
            + self.w_op * ops as f64
            + self.w_wc * wildcards as f64
            + self.w_len * length as f64
    }
}

/// An in-progress or finished selection over the candidate pool.
#[derive(Clone, Debug)]
pub(crate) struct Selection {
    /// Indices into the candidate pool, in selection order.
    pub chosen: Vec<usize>,
    /// Union of chosen candidates' include hits.
    pub include_bits: DynamicBitSet,
    /// Union of chosen candidates' exclude hits.
    pub exclude_bits: DynamicBitSet,
    /// Running totals for the cost function.
    pub wildcards: usize,
    pub length: usize,
}

impl Selection {
    pub fn empty(n_include: usize, n_exclude: usize) -> Self {
        Self {
            chosen: Vec::new(),
            include_bits: DynamicBitSet::empty(n_include),
            exclude_bits: DynamicBitSet::empty(n_exclude),
            wildcards: 0,
            length: 0,
        }
    }

    pub fn covered(&self) -> usize {
        self.include_bits.count()
    }

    pub fn fp(&self) -> usize {
        self.exclude_bits.count()
    }
}

/// Runs greedy selection and returns the chosen set.
pub(crate) fn greedy_select(
    candidates: &[Candidate],
    coverage: &[CoveragePair],
    n_include: usize,
    params: &CostParams,
    budgets: &ResolvedBudgets,
) -> Selection {
    debug_assert_eq!(candidates.len(), coverage.len());
    let n_exclude = coverage
        .first()
        .map(|pair| pair.exclude.bit_length())
        .unwrap_or(0);
    let mut selection = Selection::empty(n_include, n_exclude);
    let mut current_cost = params.cost(n_include, 0, 0, 0, 0, 0);

    loop {
        // Perfect cover: additional patterns can only increase cost.
        if selection.include_bits.is_full() && selection.exclude_bits.is_empty() {
            break;
        }
        if let Some(max) = budgets.max_patterns {
            if selection.chosen.len() >= max {
                break;
            }
        }

        let mut best: Option<BestCandidate> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let pair = &coverage[idx];
            let covered = selection.include_bits.union_count(&pair.include);
            let fp = selection.exclude_bits.union_count(&pair.exclude);
            let fn_count = n_include - covered;

            if budgets.max_fp.is_some_and(|max| fp > max) {
                continue;
            }
            if budgets.max_fn.is_some_and(|max| fn_count > max) {
                continue;
            }

            let trial_cost = params.cost(
                n_include,
                covered,
                fp,
                selection.chosen.len() + 1,
                selection.wildcards + candidate.wildcards,
                selection.length + candidate.length,
            );
            let gain = covered - selection.covered();
            let entry = BestCandidate {
                idx,
                cost: trial_cost,
                gain,
                covered,
                fp,
            };
            let better = match &best {
                None => true,
                Some(current) => entry.beats(current, candidates),
            };
            if better {
                best = Some(entry);
            }
        }

        match best {
            Some(found) if found.cost < current_cost => {
                let pair = &coverage[found.idx];
                selection.include_bits.union_with(&pair.include);
                selection.exclude_bits.union_with(&pair.exclude);
                selection.wildcards += candidates[found.idx].wildcards;
                selection.length += candidates[found.idx].length;
                selection.chosen.push(found.idx);
                current_cost = found.cost;
                debug_assert_eq!(selection.covered(), found.covered);
                debug_assert_eq!(selection.fp(), found.fp);
            }
            _ => break,
        }
    }

    selection
}

struct BestCandidate {
    idx: usize,
    cost: f64,
    gain: usize,
    covered: usize,
    fp: usize,
}

impl BestCandidate {
    /// Total-order comparison: lower cost, then greater incremental gain,
    /// then fewer wildcards, then longer literal text, then lexicographic.
    fn beats(&self, other: &Self, candidates: &[Candidate]) -> bool {
        let this = &candidates[self.idx];
        let that = &candidates[other.idx];
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| other.gain.cmp(&self.gain))
            .then_with(|| this.wildcards.cmp(&that.wildcards))
            .then_with(|| that.length.cmp(&this.length))
            .then_with(|| this.text.cmp(&that.text))
            .is_lt()
    }
}
