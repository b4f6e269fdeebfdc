//! # Mapgen Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture levels and grid painting helpers
//! - Determinism harness for load and population
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
