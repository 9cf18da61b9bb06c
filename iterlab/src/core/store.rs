//! The module/iteration store and its transitions.
//!
//! Every operation is total: it either applies its change and returns `Ok`, or
//! returns `Err(Ignored)` and leaves the collection exactly as it was. Guards
//! that collaborators would otherwise re-check (lock state, selectability,
//! pending status) live here. The store never returns `Ignored::Busy`; that
//! one belongs to `Session`.

use crate::core::numbering::{Numbering, highest_numeric_id, next_iteration_number};
use crate::core::types::{Ignored, Iteration, IterationStatus, Module, Outcome};

/// Knobs that shape newly created modules and iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub numbering: Numbering,
    /// Title shown while an iteration is `adding`.
    pub placeholder_title: String,
    /// Title used when completion supplies none.
    pub fallback_title: String,
    /// New modules are titled `"<prefix> <id>"`.
    pub module_title_prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            numbering: Numbering::Length,
            placeholder_title: "Adding iteration...".to_string(),
            fallback_title: "New Iteration".to_string(),
            module_title_prefix: "Module".to_string(),
        }
    }
}

/// Owned, ordered collection of modules (order = creation order).
#[derive(Debug, Clone, Default)]
pub struct ModuleStore {
    modules: Vec<Module>,
    next_module_seq: u32,
    settings: StoreSettings,
}

impl ModuleStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            modules: Vec::new(),
            next_module_seq: 0,
            settings,
        }
    }

    /// Seed a store with pre-built modules (e.g. ones holding `draft` iterations).
    ///
    /// Module numbering continues after the largest numeric module id, and each
    /// module's iteration counter is raised to at least its largest numeric
    /// iteration id.
    pub fn from_modules(mut modules: Vec<Module>, settings: StoreSettings) -> Self {
        for module in &mut modules {
            module.next_iteration_seq = module.next_iteration_seq.max(highest_numeric_id(module));
        }
        let next_module_seq = modules
            .iter()
            .filter_map(|m| m.id.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Self {
            modules,
            next_module_seq,
            settings,
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    /// Owned copy of the collection for a collaborator to render from.
    pub fn snapshot(&self) -> Vec<Module> {
        self.modules.clone()
    }

    /// Append an empty, unlocked, collapsed module and return its id.
    ///
    /// Fails with `IdsExhausted` once the module counter reaches `u32::MAX`,
    /// which only happens when a seeded module already carries that id.
    pub fn create_module(&mut self) -> Outcome<String> {
        let seq = self
            .next_module_seq
            .checked_add(1)
            .ok_or(Ignored::IdsExhausted)?;
        self.next_module_seq = seq;
        let id = seq.to_string();
        let title = format!("{} {}", self.settings.module_title_prefix, id);
        self.modules.push(Module::new(id.clone(), title));
        Ok(id)
    }

    /// Flip `is_expanded`. Lock state is not consulted.
    pub fn toggle_expand(&mut self, module_id: &str) -> Outcome<bool> {
        let module = self.module_mut(module_id)?;
        module.is_expanded = !module.is_expanded;
        Ok(module.is_expanded)
    }

    /// Flip `is_locked`, collapsing the module when it becomes locked.
    ///
    /// Unlocking leaves `is_expanded` as it is.
    pub fn toggle_lock(&mut self, module_id: &str) -> Outcome<bool> {
        let module = self.module_mut(module_id)?;
        module.is_locked = !module.is_locked;
        if module.is_locked {
            module.is_expanded = false;
        }
        Ok(module.is_locked)
    }

    /// Lock and collapse unconditionally. Idempotent.
    pub fn lock_module(&mut self, module_id: &str) -> Outcome {
        let module = self.module_mut(module_id)?;
        module.is_locked = true;
        module.is_expanded = false;
        Ok(())
    }

    /// Clear selection on every iteration. Allowed on locked modules.
    pub fn reset_module(&mut self, module_id: &str) -> Outcome {
        let module = self.module_mut(module_id)?;
        for iteration in &mut module.iterations {
            iteration.is_selected = false;
        }
        Ok(())
    }

    /// Flip `is_selected` on a completed iteration of an unlocked module.
    pub fn toggle_selection(&mut self, module_id: &str, iteration_id: &str) -> Outcome<bool> {
        let module = self.unlocked_module_mut(module_id)?;
        let iteration = module
            .iteration_mut(iteration_id)
            .ok_or(Ignored::UnknownIteration)?;
        if !iteration.is_selectable() {
            return Err(Ignored::NotSelectable);
        }
        iteration.is_selected = !iteration.is_selected;
        Ok(iteration.is_selected)
    }

    /// Append a pending iteration and return its id.
    pub fn begin_add_iteration(&mut self, module_id: &str) -> Outcome<String> {
        let numbering = self.settings.numbering;
        let placeholder = self.settings.placeholder_title.clone();
        let module = self.unlocked_module_mut(module_id)?;

        let number = next_iteration_number(module, numbering).ok_or(Ignored::IdsExhausted)?;
        module.next_iteration_seq = module.next_iteration_seq.max(number);
        let id = number.to_string();
        module.iterations.push(Iteration::pending(id.clone(), placeholder));
        Ok(id)
    }

    /// Finish a pending iteration with `title` as given, or the fallback title
    /// when `title` is missing or blank.
    ///
    /// Runs on locked modules too, so an add begun before a lock still lands.
    /// An iteration that was removed in the meantime stays removed. When length
    /// numbering has produced duplicate ids, the pending one is the target.
    pub fn complete_add_iteration(
        &mut self,
        module_id: &str,
        iteration_id: &str,
        title: Option<&str>,
    ) -> Outcome {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => self.settings.fallback_title.clone(),
        };
        let module = self.module_mut(module_id)?;
        let index = pending_index(module, iteration_id)?;
        let iteration = &mut module.iterations[index];
        iteration.status = IterationStatus::Completed;
        iteration.title = title;
        Ok(())
    }

    /// Remove an iteration whatever its status.
    pub fn remove_iteration(&mut self, module_id: &str, iteration_id: &str) -> Outcome {
        let module = self.unlocked_module_mut(module_id)?;
        let index = module
            .iterations
            .iter()
            .position(|it| it.id == iteration_id)
            .ok_or(Ignored::UnknownIteration)?;
        module.iterations.remove(index);
        Ok(())
    }

    /// Drop an iteration whose creation was cancelled. Only `adding` iterations
    /// are affected.
    pub fn abandon_add_iteration(&mut self, module_id: &str, iteration_id: &str) -> Outcome {
        let module = self.module_mut(module_id)?;
        let index = pending_index(module, iteration_id)?;
        module.iterations.remove(index);
        Ok(())
    }

    fn module_mut(&mut self, module_id: &str) -> Outcome<&mut Module> {
        self.modules
            .iter_mut()
            .find(|m| m.id == module_id)
            .ok_or(Ignored::UnknownModule)
    }

    fn unlocked_module_mut(&mut self, module_id: &str) -> Outcome<&mut Module> {
        let module = self.module_mut(module_id)?;
        if module.is_locked {
            return Err(Ignored::ModuleLocked);
        }
        Ok(module)
    }
}

/// Position of the `adding` iteration with `iteration_id`.
///
/// `NotPending` if the id exists only on iterations past `adding`.
fn pending_index(module: &Module, iteration_id: &str) -> Outcome<usize> {
    if let Some(index) = module
        .iterations
        .iter()
        .position(|it| it.id == iteration_id && it.status == IterationStatus::Adding)
    {
        return Ok(index);
    }
    if module.iteration(iteration_id).is_some() {
        return Err(Ignored::NotPending);
    }
    Err(Ignored::UnknownIteration)
}
