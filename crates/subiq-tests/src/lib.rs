//! subiq End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the conversion flows:
//!
//! - Conversion: capture -> `.c16` + `.txt`
//! - Batch: directories of mixed inputs through the CLI library
//! - **Determinism**: byte-identical output across runs
//! - Properties: parser round trips, sample-count law, amplitude bound
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p subiq-tests
//! cargo test -p subiq-tests --test proptest_properties
//! ```

pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use determinism::{
    compute_hash, convert_to_bytes, verify_determinism, verify_hash_determinism, DeterminismResult,
    DiffInfo,
};
pub use fixtures::InputDir;
