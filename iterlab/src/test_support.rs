//! Test-only helpers for constructing modules and iterations.

use crate::core::types::{Iteration, Module};
use crate::session::{CreationFuture, CreationRequest, CreationService};

/// Create an unlocked, collapsed module holding `iterations`.
pub fn module_with(id: &str, iterations: Vec<Iteration>) -> Module {
    Module {
        iterations,
        ..Module::new(id, format!("Module {}", id))
    }
}

/// Create a completed iteration that is already selected.
pub fn selected(id: &str, title: &str) -> Iteration {
    let mut iteration = Iteration::completed(id, title);
    iteration.is_selected = true;
    iteration
}

/// Create a locked module (collapsed, as locking always collapses).
pub fn locked_module_with(id: &str, iterations: Vec<Iteration>) -> Module {
    let mut module = module_with(id, iterations);
    module.is_locked = true;
    module
}

/// Creation service that resolves at once with the requested title.
pub struct ImmediateCreation;

impl CreationService for ImmediateCreation {
    fn create(&self, request: &CreationRequest) -> CreationFuture {
        let title = request.title.clone();
        Box::pin(async move { title })
    }
}
