//! Discovers concise boolean expressions over glob-wildcard patterns that
//! separate an *include* set from an *exclude* set of hierarchical strings.
//!
//! Given two finite sets of strings (or structured multi-field rows), the
//! solver returns a disjunction of patterns (conjunctive per-field
//! expressions in structured mode), coverage metrics, supporting witness
//! examples, and diagnostics about the candidate pool.
//!
//! High-level flow (single field):
//! 1) Tokenize include items (class-change splits, delimiter-preserving
//!    merge of short tokens).
//! 2) Generate and score a bounded pool of candidate patterns
//!    (exact/prefix/suffix/substring/multi), each guaranteed to match at
//!    least one include item.
//! 3) Compute per-candidate include/exclude coverage bitmasks.
//! 4) Greedy cost-driven selection under soft weights and hard budgets,
//!    with an optional inverted (complement) solution.
//! 5) Specialize and refine the chosen patterns.
//!
//! Structured mode wraps the same pipeline per field and produces
//! conjunctive per-field expressions with lazy specialization.
//!
//! The core is single-threaded and deterministic: identical inputs and
//! configuration produce byte-identical serialized results.
//!
//! # Example
//! ```
//! use patternforge::{solve, SolveOptions};
//!
//! let include = vec!["a/x/fail".to_string(), "b/y/fail".to_string()];
//! let exclude = vec!["a/x/pass".to_string()];
//! let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();
//! assert!(solution.raw_expr.contains("fail"));
//! assert_eq!(solution.metrics.covered, 2);
//! assert_eq!(solution.metrics.fp, 0);
//! ```

pub mod api;
pub mod boolex;
mod candidates;
mod coverage;
pub mod diag;
mod expand;
pub mod matcher;
mod refine;
mod select;
pub mod solver;
pub mod stdx;
pub mod structured;
pub mod tokens;

pub use api::{
    Budgets, ConfigError, Effort, InputError, InvertStrategy, Limit, Metrics, Pattern,
    PatternKind, PerField, QualityMode, Solution, SolveError, SolveOptions, SplitMethod, Term,
    Weight, Weights, Witnesses,
};
pub use diag::{SolveDiagnostics, Stage};
pub use solver::solve;
pub use structured::{solve_structured, Row};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
