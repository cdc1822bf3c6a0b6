//! Small, self-contained data structures used across the solver.
//!
//! # Scope
//! `stdx` hosts narrow, allocation-light utilities tuned for predictable
//! memory use and fast paths rather than general-purpose ergonomics.
//!
//! # Module map
//! - `bitset`: dynamic bitset with word-level operations and projected
//!   (non-materializing) union/difference counts for the selector hot loop.

pub mod bitset;

pub use bitset::{words_for_bits, DynamicBitSet, DynamicBitSetIterator};
