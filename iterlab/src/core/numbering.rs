//! Iteration id numbering policies.

use serde::{Deserialize, Serialize};

use crate::core::types::Module;

/// How `begin_add_iteration` derives the next iteration id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Numbering {
    /// `iterations.len() + 1` at the time of the call.
    ///
    /// Removing an earlier iteration and adding a new one repeats an id.
    #[default]
    Length,
    /// Per-module counter that survives removals.
    Monotonic,
}

/// Number the next iteration of `module` would receive, or `None` once the
/// policy has run past `u32::MAX`.
pub fn next_iteration_number(module: &Module, numbering: Numbering) -> Option<u32> {
    let last = match numbering {
        Numbering::Length => u32::try_from(module.iterations.len()).ok()?,
        Numbering::Monotonic => module.next_iteration_seq.max(highest_numeric_id(module)),
    };
    last.checked_add(1)
}

/// Largest iteration id that parses as a number, or 0.
pub fn highest_numeric_id(module: &Module) -> u32 {
    module
        .iterations
        .iter()
        .filter_map(|it| it.id.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}
