//! End-to-end scenario tests for the pattern solver.
//!
//! Run with: `cargo test --test integration`

mod errors;
mod expr_verification;
mod scenarios;
mod serialization;
