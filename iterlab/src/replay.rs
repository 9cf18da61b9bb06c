//! Drive a session through a scripted sequence of steps.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::invariants::validate_invariants;
use crate::core::store::ModuleStore;
use crate::core::types::{Module, Outcome};
use crate::io::config::LabConfig;
use crate::io::script::{Script, Step};
use crate::session::{CreationService, Session, SimulatedCreation};

/// A step that left the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredStep {
    /// Zero-based position in the script.
    pub index: usize,
    pub op: &'static str,
    pub reason: String,
}

/// Final state after a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub modules: Vec<Module>,
    pub ignored: Vec<IgnoredStep>,
    /// Snapshot invariant violations (see `validate_invariants`).
    pub violations: Vec<String>,
}

/// Run every step against `session` in order.
pub async fn run_steps<C: CreationService>(
    session: &mut Session<C>,
    steps: &[Step],
) -> ReplayReport {
    let mut ignored = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        match run_step(session, step).await {
            Ok(()) => debug!(index, op = step.op(), "step applied"),
            Err(reason) => {
                debug!(index, op = step.op(), %reason, "step ignored");
                ignored.push(IgnoredStep {
                    index,
                    op: step.op(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    let modules = session.store().snapshot();
    let violations = validate_invariants(&modules);
    ReplayReport {
        modules,
        ignored,
        violations,
    }
}

async fn run_step<C: CreationService>(session: &mut Session<C>, step: &Step) -> Outcome {
    match step {
        Step::CreateModule => session.store_mut().create_module().map(drop),
        Step::ToggleExpand { module } => session.store_mut().toggle_expand(module).map(drop),
        Step::ToggleLock { module } => session.store_mut().toggle_lock(module).map(drop),
        Step::LockModule { module } => session.store_mut().lock_module(module),
        Step::ResetModule { module } => session.store_mut().reset_module(module),
        Step::ToggleSelection { module, iteration } => session
            .store_mut()
            .toggle_selection(module, iteration)
            .map(drop),
        Step::BeginAdd { module } => session.store_mut().begin_add_iteration(module).map(drop),
        Step::CompleteAdd {
            module,
            iteration,
            title,
        } => session
            .store_mut()
            .complete_add_iteration(module, iteration, title.as_deref()),
        Step::RemoveIteration { module, iteration } => {
            session.store_mut().remove_iteration(module, iteration)
        }
        Step::AddIteration { module, title } => session
            .add_iteration(module, title.clone())
            .await
            .map(drop),
        Step::CancelAdd { module } => {
            let (pending, cancel) = session.begin_add(module, None)?;
            cancel.cancel();
            let completion = pending.resolve().await;
            session.apply(completion)
        }
    }
}

/// Replay `script` on a fresh single-threaded runtime using the simulated
/// creation service configured by `config`.
pub fn replay_script(script: Script, config: &LabConfig) -> Result<ReplayReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;
    let store = ModuleStore::from_modules(script.modules, config.store_settings());
    let mut session = Session::new(store, SimulatedCreation::new(config.add_delay()));
    Ok(runtime.block_on(run_steps(&mut session, &script.steps)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Ignored, Iteration, IterationStatus};
    use crate::io::script::parse_script;
    use crate::test_support::{ImmediateCreation, module_with};

    fn module(id: &str) -> String {
        id.to_string()
    }

    #[tokio::test]
    async fn run_steps_reports_ignored_steps() {
        let mut session = Session::new(ModuleStore::default(), ImmediateCreation);
        let steps = vec![
            Step::CreateModule,
            Step::LockModule { module: module("1") },
            Step::AddIteration {
                module: module("1"),
                title: None,
            },
            Step::ToggleExpand { module: module("2") },
        ];

        let report = run_steps(&mut session, &steps).await;

        assert_eq!(
            report.ignored,
            vec![
                IgnoredStep {
                    index: 2,
                    op: "add_iteration",
                    reason: Ignored::ModuleLocked.to_string(),
                },
                IgnoredStep {
                    index: 3,
                    op: "toggle_expand",
                    reason: Ignored::UnknownModule.to_string(),
                },
            ]
        );
        assert!(report.modules[0].is_locked);
        assert!(report.violations.is_empty());
    }

    #[tokio::test]
    async fn cancel_add_leaves_no_iteration() {
        let mut session = Session::new(ModuleStore::default(), ImmediateCreation);
        let steps = vec![Step::CreateModule, Step::CancelAdd { module: module("1") }];

        let report = run_steps(&mut session, &steps).await;

        assert!(report.ignored.is_empty());
        assert!(report.modules[0].iterations.is_empty());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn length_numbering_duplicates_surface_as_violations() {
        let mut session = Session::new(ModuleStore::default(), ImmediateCreation);
        let steps = vec![
            Step::CreateModule,
            Step::BeginAdd { module: module("1") },
            Step::BeginAdd { module: module("1") },
            Step::RemoveIteration {
                module: module("1"),
                iteration: "1".to_string(),
            },
            Step::BeginAdd { module: module("1") },
        ];

        let report = run_steps(&mut session, &steps).await;

        assert_eq!(
            report.violations,
            vec!["duplicate iteration id at 1/2".to_string()]
        );
    }

    #[tokio::test]
    async fn add_after_removal_completes_despite_repeated_id() {
        let mut session = Session::new(ModuleStore::default(), ImmediateCreation);
        let add = |title: &str| Step::AddIteration {
            module: module("1"),
            title: Some(title.to_string()),
        };
        let steps = vec![
            Step::CreateModule,
            add("a"),
            add("b"),
            Step::RemoveIteration {
                module: module("1"),
                iteration: "1".to_string(),
            },
            add("c"),
        ];

        let report = run_steps(&mut session, &steps).await;

        assert!(report.ignored.is_empty());
        assert_eq!(
            report.modules[0].iterations,
            vec![Iteration::completed("2", "b"), Iteration::completed("2", "c")]
        );
        assert!(!session.is_processing());
    }

    #[test]
    fn replay_script_runs_full_scenario() {
        let raw = r#"{
            "steps": [
                {"op": "create_module"},
                {"op": "toggle_expand", "module": "1"},
                {"op": "add_iteration", "module": "1", "title": "My Title"},
                {"op": "toggle_selection", "module": "1", "iteration": "1"},
                {"op": "begin_add", "module": "1"},
                {"op": "complete_add", "module": "1", "iteration": "2"}
            ]
        }"#;
        let script = parse_script(raw).expect("parse");
        let config = LabConfig {
            add_delay_ms: 1,
            ..LabConfig::default()
        };

        let report = replay_script(script, &config).expect("replay");

        let module = &report.modules[0];
        assert!(module.is_expanded);
        let mut first = Iteration::completed("1", "My Title");
        first.is_selected = true;
        assert_eq!(module.iterations[0], first);
        assert_eq!(module.iterations[1], Iteration::completed("2", "New Iteration"));
        assert!(report.ignored.is_empty());
    }

    #[test]
    fn replay_script_keeps_seeded_drafts_unselectable() {
        let script = Script {
            modules: vec![module_with("1", vec![Iteration::draft("1", "Draft")])],
            steps: vec![Step::ToggleSelection {
                module: module("1"),
                iteration: "1".to_string(),
            }],
        };
        let config = LabConfig {
            add_delay_ms: 0,
            ..LabConfig::default()
        };

        let report = replay_script(script, &config).expect("replay");

        assert_eq!(report.ignored[0].reason, Ignored::NotSelectable.to_string());
        assert_eq!(report.modules[0].iterations[0].status, IterationStatus::Draft);
    }
}
