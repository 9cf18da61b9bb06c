//! Shared deterministic types for the module/iteration store.
//!
//! These types are the snapshot contract handed to rendering collaborators.
//! Field names serialize in camelCase so a snapshot reads the same way the
//! collaborators address it (`isLocked`, `isSelected`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    /// Creation finished; the only selectable status.
    Completed,
    /// Creation begun, waiting for the external creation step.
    Adding,
    /// Constructed directly; no transition in or out.
    Draft,
}

impl IterationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IterationStatus::Completed => "completed",
            IterationStatus::Adding => "adding",
            IterationStatus::Draft => "draft",
        }
    }
}

/// One titled, selectable unit of work owned by exactly one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iteration {
    pub id: String,
    pub title: String,
    pub is_selected: bool,
    pub status: IterationStatus,
}

impl Iteration {
    /// Iteration that was just begun and still carries its placeholder title.
    pub fn pending(id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: placeholder.into(),
            is_selected: false,
            status: IterationStatus::Adding,
        }
    }

    pub fn completed(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_selected: false,
            status: IterationStatus::Completed,
        }
    }

    /// Draft iterations are only reachable through direct construction.
    pub fn draft(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_selected: false,
            status: IterationStatus::Draft,
        }
    }

    /// Only completed iterations take part in selection.
    pub fn is_selectable(&self) -> bool {
        self.status == IterationStatus::Completed
    }
}

/// A named, lockable, expandable container of iterations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub title: String,
    pub is_locked: bool,
    pub is_expanded: bool,
    pub iterations: Vec<Iteration>,
    /// Highest iteration number ever issued in this module. Never decreases.
    #[serde(default)]
    pub next_iteration_seq: u32,
}

impl Module {
    /// Fresh module: unlocked, collapsed, no iterations.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_locked: false,
            is_expanded: false,
            iterations: Vec::new(),
            next_iteration_seq: 0,
        }
    }

    pub fn iteration(&self, iteration_id: &str) -> Option<&Iteration> {
        self.iterations.iter().find(|it| it.id == iteration_id)
    }

    pub(crate) fn iteration_mut(&mut self, iteration_id: &str) -> Option<&mut Iteration> {
        self.iterations.iter_mut().find(|it| it.id == iteration_id)
    }

    /// Ids of iterations currently marked selected, in display order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.iterations
            .iter()
            .filter(|it| it.is_selected)
            .map(|it| it.id.as_str())
            .collect()
    }
}

/// Why a store operation left the collection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    UnknownModule,
    UnknownIteration,
    /// Iteration mutation attempted on a locked module.
    ModuleLocked,
    /// Selection attempted on an iteration that is not completed.
    NotSelectable,
    /// Completion or cancellation of an iteration that is no longer adding.
    NotPending,
    /// A new add was requested while another one is outstanding.
    ///
    /// Only `Session::begin_add` returns this; the store accepts any number
    /// of pending iterations.
    Busy,
    /// The module or iteration counter would run past `u32::MAX`.
    IdsExhausted,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Ignored::UnknownModule => "module not found",
            Ignored::UnknownIteration => "iteration not found",
            Ignored::ModuleLocked => "module is locked",
            Ignored::NotSelectable => "iteration is not completed",
            Ignored::NotPending => "iteration is not being added",
            Ignored::Busy => "another add is in progress",
            Ignored::IdsExhausted => "no ids left",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Ignored {}

/// Result of a store or session operation. `Err` always means the collection
/// is unchanged.
pub type Outcome<T = ()> = Result<T, Ignored>;
