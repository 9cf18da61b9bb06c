//! In-memory model of experiment modules and their iterations.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (the store and its transitions,
//!   id numbering, title classification, snapshot invariants). No I/O.
//! - **[`io`]**: Side-effecting operations (config and script files).
//!
//! [`session`] wraps the store for rendering collaborators and models the
//! asynchronous add flow; [`replay`] drives a session from a script for the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod replay;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
