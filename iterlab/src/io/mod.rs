//! I/O helpers for iterlab commands.

pub mod config;
pub mod script;
