//! Semantic invariants over a module snapshot.

use std::collections::HashSet;

use crate::core::types::Module;

/// Check invariants a snapshot should hold:
/// - No duplicate module ids
/// - No duplicate iteration ids within a module
/// - Only completed iterations are selected
///
/// Length numbering can legitimately produce duplicate iteration ids, so
/// callers decide whether a violation is fatal.
pub fn validate_invariants(modules: &[Module]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_modules = HashSet::new();

    for module in modules {
        if !seen_modules.insert(module.id.as_str()) {
            errors.push(format!("duplicate module id '{}'", module.id));
        }
        validate_module(module, &mut errors);
    }

    errors
}

fn validate_module(module: &Module, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for iteration in &module.iterations {
        let path = format!("{}/{}", module.id, iteration.id);
        if !seen.insert(iteration.id.as_str()) {
            errors.push(format!("duplicate iteration id at {}", path));
        }
        if iteration.is_selected && !iteration.is_selectable() {
            errors.push(format!(
                "{}: selected while status={}",
                path,
                iteration.status.as_str()
            ));
        }
    }
}
