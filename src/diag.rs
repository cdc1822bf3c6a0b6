//! Solve-time diagnostics counters.
//!
//! The solver has no logging layer; its observability surface is this
//! counters struct, carried inside every [`Solution`](crate::api::Solution).
//! Hitting `max_candidates` is expected truncation, not an error, and must
//! be visible to callers; `truncated` is that signal.

use serde::{Deserialize, Serialize};

/// Pipeline stage reached by a solve.
///
/// Stages are linear; the only non-linear branch is the inversion check at
/// `Selected`, which may swap the chosen set before `Expanded`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Initialized,
    Tokenized,
    CandidatesScored,
    Selected,
    Expanded,
    Refined,
    Finalized,
}

/// Counters describing how a solve went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// Distinct candidates produced by the generator before retention.
    pub candidates_generated: usize,
    /// Candidates kept after the `max_candidates` top-k cut.
    pub candidates_retained: usize,
    /// `true` when the pool was cut down to `max_candidates`.
    pub truncated: bool,
    /// Stage the pipeline reached; `Finalized` for every returned solution.
    pub stage: Stage,
}
