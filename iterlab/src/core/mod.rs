//! Deterministic, pure logic for the module/iteration model.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod invariants;
pub mod numbering;
pub mod store;
pub mod types;
