//! Property-based soundness tests for the solver pipeline.
//!
//! Run with: `cargo test --test property`

mod metrics_consistency;
mod reconstitution;

use proptest::prelude::*;

/// A hierarchical path-like string from a deliberately small alphabet, so
/// include/exclude sets collide often enough to exercise the hard cases.
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-d]{1,6}", 1..5).prop_map(|segments| segments.join("/"))
}

pub fn dataset_strategy() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    (
        prop::collection::vec(path_strategy(), 0..8),
        prop::collection::vec(path_strategy(), 0..8),
    )
}
