//! Public API data types for configuring the solver and reporting results.
//!
//! Purpose: provide the shared configuration and result structs used by the
//! solver and its callers. These types are intentionally behavior-free; the
//! solver validates options and fails fast before any work begins.
//!
//! # Invariants
//! - `SolveOptions` is validated at solve time; an invalid combination
//!   produces a [`ConfigError`] and no partial result.
//! - Result-side types serialize to flat keys and primitive values only, so
//!   solutions round-trip through language-neutral containers.
//! - Scalar-or-per-field parameters use the tagged [`PerField`] wrapper
//!   rather than dual-typed fields; unlisted fields resolve to a default.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diag::SolveDiagnostics;

/// Quality mode for a solve.
///
/// `Exact` is shorthand for `max_fp = 0`: the returned solution never
/// matches an exclude item, even when that forces an empty pattern list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityMode {
    #[default]
    Exact,
    Approx,
}

/// Effort level controlling structured-solver candidate volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    /// Fast: fewer patterns per field, single-field expressions only.
    Low,
    /// Balanced default.
    #[default]
    Medium,
    /// More patterns per field, multi-field specialization enabled.
    High,
    /// Reserved for small datasets (`N < 100`, `F < 5`); rejected otherwise.
    Exhaustive,
}

impl Effort {
    /// Per-field candidate cap for the structured solver.
    pub(crate) fn patterns_per_field(self) -> usize {
        match self {
            Effort::Low => 50,
            Effort::Medium => 100,
            Effort::High | Effort::Exhaustive => 200,
        }
    }

    /// Whether expressions may combine patterns from several fields.
    pub(crate) fn multi_field(self) -> bool {
        !matches!(self, Effort::Low)
    }
}

/// Inversion strategy for single-field solves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvertStrategy {
    /// Choose whichever of base/inverted has lower cost, subject to the
    /// FP budget.
    #[default]
    Auto,
    /// Always return the base selection.
    Never,
    /// Return the inverted selection when it respects the FP budget;
    /// fall back to base otherwise.
    Always,
}

/// Raw-split strategy for the tokenizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Boundaries on alphabetic / digit / other class transitions.
    #[default]
    ClassChange,
    /// Every character is its own token; forces `min_token_len = 1`.
    Char,
}

/// Shape class of a glob pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// No wildcard; matches one string exactly.
    Exact,
    /// `text*`, anchored at the start.
    Prefix,
    /// `*text`, anchored at the end.
    Suffix,
    /// `*text*`.
    Substring,
    /// `*a*b*...*`, ordered segments.
    Multi,
}

impl PatternKind {
    /// All kinds, in stable order.
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Exact,
        PatternKind::Prefix,
        PatternKind::Suffix,
        PatternKind::Substring,
        PatternKind::Multi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Exact => "exact",
            PatternKind::Prefix => "prefix",
            PatternKind::Suffix => "suffix",
            PatternKind::Substring => "substring",
            PatternKind::Multi => "multi",
        }
    }
}

impl std::str::FromStr for PatternKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(PatternKind::Exact),
            "prefix" => Ok(PatternKind::Prefix),
            "suffix" => Ok(PatternKind::Suffix),
            "substring" => Ok(PatternKind::Substring),
            "multi" => Ok(PatternKind::Multi),
            other => Err(ConfigError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A parameter that is either one global value or a per-field map.
///
/// Per-field lookups fall back to the hardcoded default for fields not in
/// the map; single-field solves always resolve the uniform/default arm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerField<T> {
    /// One value for every field.
    Uniform(T),
    /// Explicit values per field name; unlisted fields use the default.
    ByField(BTreeMap<String, T>),
}

impl<T: Clone> PerField<T> {
    /// Resolves the value for `field`, with `default` for unlisted fields.
    ///
    /// `field = None` (single-field mode) resolves `Uniform` directly and
    /// falls back to `default` for `ByField`.
    pub fn resolve(&self, field: Option<&str>, default: T) -> T {
        match self {
            PerField::Uniform(value) => value.clone(),
            PerField::ByField(map) => field
                .and_then(|name| map.get(name).cloned())
                .unwrap_or(default),
        }
    }

    /// All explicit values, for validation sweeps.
    pub(crate) fn values(&self) -> Vec<T> {
        match self {
            PerField::Uniform(value) => vec![value.clone()],
            PerField::ByField(map) => map.values().cloned().collect(),
        }
    }
}

/// A soft weight: scalar or per-field.
pub type Weight = PerField<f64>;

/// Soft weights for the selector's cost function.
///
/// Per-field weights contribute proportionally to the fraction of chosen
/// patterns on that field. `w_field` is different in kind: it multiplies
/// candidate *scores* during generation and never enters the cost function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Candidate-score multiplier per field (structured mode only).
    /// A weight of 0 suppresses the field entirely.
    pub w_field: Option<BTreeMap<String, f64>>,
    /// Penalty per false positive.
    pub w_fp: Weight,
    /// Penalty per false negative.
    pub w_fn: Weight,
    /// Penalty per chosen pattern.
    pub w_pattern: Weight,
    /// Penalty per boolean operator (`|patterns| - 1`).
    pub w_op: Weight,
    /// Penalty per wildcard character across chosen patterns.
    pub w_wc: Weight,
    /// Penalty per literal character across chosen patterns.
    pub w_len: Weight,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            w_field: None,
            w_fp: PerField::Uniform(1.0),
            w_fn: PerField::Uniform(1.0),
            w_pattern: PerField::Uniform(0.05),
            w_op: PerField::Uniform(0.02),
            w_wc: PerField::Uniform(0.01),
            w_len: PerField::Uniform(0.001),
        }
    }
}

/// A hard budget limit.
///
/// `Count(0)` means exactly zero; fractions are resolved against the
/// include-set size and must lie strictly between 0 and 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Limit {
    Count(u64),
    Fraction(f64),
}

impl Limit {
    /// Resolves to an absolute count against `total` rows.
    pub fn resolve(self, total: usize) -> usize {
        match self {
            Limit::Count(n) => n as usize,
            Limit::Fraction(f) => (f * total as f64) as usize,
        }
    }
}

/// Hard constraints on the solution search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budgets {
    /// Retained candidate pool size; exceeding it is truncation, not an
    /// error (reported via diagnostics).
    pub max_candidates: usize,
    /// Maximum number of chosen patterns.
    pub max_patterns: Option<Limit>,
    /// Maximum false positives; `EXACT` mode forces this to zero when unset.
    pub max_fp: Option<Limit>,
    /// Maximum false negatives.
    pub max_fn: Option<Limit>,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            max_candidates: 4000,
            max_patterns: None,
            max_fp: None,
            max_fn: None,
        }
    }
}

/// Unified options for single-field and structured solves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    pub mode: QualityMode,
    pub effort: Effort,
    /// Tokenizer split strategy, global or per field.
    pub splitmethod: PerField<SplitMethod>,
    /// Minimum token length, global or per field. Must be >= 1.
    pub min_token_len: PerField<usize>,
    /// Per-row cap on substring candidates.
    pub per_word_substrings: usize,
    /// Maximum segments in a multi pattern.
    pub max_multi_segments: usize,
    pub weights: Weights,
    pub budgets: Budgets,
    pub invert: InvertStrategy,
    /// Restricts generated pattern kinds; `None` allows all, an empty set
    /// is a configuration error.
    pub allowed_patterns: Option<BTreeSet<PatternKind>>,
}

/// Default minimum token length when unspecified for a field.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            mode: QualityMode::Exact,
            effort: Effort::Medium,
            splitmethod: PerField::Uniform(SplitMethod::ClassChange),
            min_token_len: PerField::Uniform(DEFAULT_MIN_TOKEN_LEN),
            per_word_substrings: 16,
            max_multi_segments: 3,
            weights: Weights::default(),
            budgets: Budgets::default(),
            invert: InvertStrategy::Auto,
            allowed_patterns: None,
        }
    }
}

impl SolveOptions {
    /// Validates the data-independent parts of the option set.
    ///
    /// Checks that need the dataset size (fraction resolution, effort
    /// gating, contradictory budgets) run at solve time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("w_fp", &self.weights.w_fp),
            ("w_fn", &self.weights.w_fn),
            ("w_pattern", &self.weights.w_pattern),
            ("w_op", &self.weights.w_op),
            ("w_wc", &self.weights.w_wc),
            ("w_len", &self.weights.w_len),
        ] {
            for value in weight.values() {
                if value < 0.0 || !value.is_finite() {
                    return Err(ConfigError::NegativeWeight { name, value });
                }
            }
        }
        if let Some(map) = &self.weights.w_field {
            for (field, &value) in map {
                if value < 0.0 || !value.is_finite() {
                    return Err(ConfigError::NegativeFieldWeight {
                        field: field.clone(),
                        value,
                    });
                }
            }
        }
        for value in self.min_token_len.values() {
            if value == 0 {
                return Err(ConfigError::InvalidMinTokenLen);
            }
        }
        if let Some(set) = &self.allowed_patterns {
            if set.is_empty() {
                return Err(ConfigError::NoAllowedKinds);
            }
        }
        for (name, limit) in [
            ("max_patterns", self.budgets.max_patterns),
            ("max_fp", self.budgets.max_fp),
            ("max_fn", self.budgets.max_fn),
        ] {
            if let Some(Limit::Fraction(f)) = limit {
                if !(f > 0.0 && f < 1.0) {
                    return Err(ConfigError::InvalidFraction { name, value: f });
                }
            }
        }
        Ok(())
    }
}

/// One selected glob pattern with its coverage statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Stable symbolic label (`P1`, `P2`, ...), assigned at selection time.
    pub id: String,
    /// Glob text; always contains at least one literal character.
    pub text: String,
    pub kind: PatternKind,
    /// Count of `*` characters in `text`.
    pub wildcards: usize,
    /// Count of literal characters in `text`.
    pub length: usize,
    /// Field this pattern applies to; always present in structured mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
    /// Include items this pattern matches.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub matches: Option<usize>,
    /// Exclude items this pattern matches.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fp: Option<usize>,
}

/// Aggregate coverage metrics for a solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Include items matched by the solution.
    pub covered: usize,
    pub total_positive: usize,
    /// Exclude items matched by the solution.
    pub fp: usize,
    /// Include items missed by the solution.
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub total_negative: usize,
    /// Number of selected patterns.
    pub patterns: usize,
    /// `max(0, patterns - 1)`.
    pub boolean_ops: usize,
    /// Total wildcard characters across patterns.
    pub wildcards: usize,
    /// Total literal characters across patterns.
    pub pattern_chars: usize,
}

/// Bounded example items per outcome category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witnesses {
    pub tp_examples: Vec<String>,
    pub fp_examples: Vec<String>,
    pub fn_examples: Vec<String>,
}

/// One structured-mode conjunction: patterns on one or more fields that
/// must all match a row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Field name to pattern text.
    pub fields: BTreeMap<String, String>,
    /// Include rows matched by this term alone.
    pub matches: usize,
    /// Exclude rows matched by this term alone.
    pub fp: usize,
    /// Include rows this term misses.
    #[serde(rename = "fn")]
    pub fn_: usize,
    /// Include rows newly covered by this term in selection order.
    pub incremental_matches: usize,
    /// Exclude rows newly hit by this term in selection order.
    pub incremental_fp: usize,
    /// Total literal characters across the term's patterns.
    pub length: usize,
}

/// Final result of a solve.
///
/// Serializes to flat keys and primitive values; two identical runs
/// produce byte-identical serialized output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Symbolic form, e.g. `"P1 | P2"` or `"(pin: P1) & (module: P2) | (pin: P3)"`.
    pub expr: String,
    /// Same shape with raw glob texts in place of labels.
    pub raw_expr: String,
    pub patterns: Vec<Pattern>,
    pub metrics: Metrics,
    pub witnesses: Witnesses,
    /// When `true`, the solution denotes everything EXCEPT the disjunction.
    pub global_inverted: bool,
    /// Structured mode only: the selected conjunctions in order.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub terms: Option<Vec<Term>>,
    pub diagnostics: SolveDiagnostics,
}

/// Configuration errors; surfaced before any work begins.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A cost weight is negative or non-finite.
    NegativeWeight { name: &'static str, value: f64 },
    /// A `w_field` entry is negative or non-finite.
    NegativeFieldWeight { field: String, value: f64 },
    /// `min_token_len` must be at least 1.
    InvalidMinTokenLen,
    /// `allowed_patterns` is present but empty.
    NoAllowedKinds,
    /// A pattern-kind name that is not one of the five kinds.
    UnknownKind { kind: String },
    /// A fractional budget lies outside `(0, 1)`.
    InvalidFraction { name: &'static str, value: f64 },
    /// Budgets that cannot be satisfied together on this input.
    ContradictoryBudgets { detail: String },
    /// `effort = exhaustive` on a dataset beyond `N < 100`, `F < 5`.
    ExhaustiveTooLarge { rows: usize, fields: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeWeight { name, value } => {
                write!(
                    f,
                    "weight {name} must be non-negative and finite, got {value}"
                )
            }
            Self::NegativeFieldWeight { field, value } => {
                write!(
                    f,
                    "field weight for {field:?} must be non-negative and finite, got {value}"
                )
            }
            Self::InvalidMinTokenLen => write!(f, "min_token_len must be at least 1"),
            Self::NoAllowedKinds => write!(f, "allowed_patterns must not be empty"),
            Self::UnknownKind { kind } => {
                write!(
                    f,
                    "unknown pattern kind {kind:?} (expected exact, prefix, suffix, substring, or multi)"
                )
            }
            Self::InvalidFraction { name, value } => {
                write!(f, "fractional budget {name} must lie in (0, 1), got {value}")
            }
            Self::ContradictoryBudgets { detail } => {
                write!(f, "contradictory budgets: {detail}")
            }
            Self::ExhaustiveTooLarge { rows, fields } => {
                write!(
                    f,
                    "effort=exhaustive requires fewer than 100 rows and 5 fields, got {rows} rows, {fields} fields"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Input-shape errors for structured rows; surfaced before any work begins.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum InputError {
    /// A row's field set differs from the one detected on the first row.
    FieldMismatch {
        /// Zero-based row position; include rows come first.
        row: usize,
        detail: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldMismatch { row, detail } => {
                write!(f, "row {row} field set mismatch: {detail}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Any error a solve entry point can return.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SolveError {
    Config(ConfigError),
    Input(InputError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Input(err) => write!(f, "input error: {err}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Input(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<InputError> for SolveError {
    fn from(err: InputError) -> Self {
        Self::Input(err)
    }
}
