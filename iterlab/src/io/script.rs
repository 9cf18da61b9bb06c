//! Replay scripts: JSON documents describing a sequence of user intents.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::types::Module;

const SCRIPT_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/script/v1.schema.json"
));

/// One user intent, addressed by module (and iteration) id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CreateModule,
    ToggleExpand {
        module: String,
    },
    ToggleLock {
        module: String,
    },
    LockModule {
        module: String,
    },
    ResetModule {
        module: String,
    },
    ToggleSelection {
        module: String,
        iteration: String,
    },
    /// Append a pending iteration without completing it.
    BeginAdd {
        module: String,
    },
    CompleteAdd {
        module: String,
        iteration: String,
        #[serde(default)]
        title: Option<String>,
    },
    RemoveIteration {
        module: String,
        iteration: String,
    },
    /// Full add flow: begin, wait for the creation service, apply.
    AddIteration {
        module: String,
        #[serde(default)]
        title: Option<String>,
    },
    /// Begin an add and cancel it before it completes.
    CancelAdd {
        module: String,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::CreateModule => "create_module",
            Step::ToggleExpand { .. } => "toggle_expand",
            Step::ToggleLock { .. } => "toggle_lock",
            Step::LockModule { .. } => "lock_module",
            Step::ResetModule { .. } => "reset_module",
            Step::ToggleSelection { .. } => "toggle_selection",
            Step::BeginAdd { .. } => "begin_add",
            Step::CompleteAdd { .. } => "complete_add",
            Step::RemoveIteration { .. } => "remove_iteration",
            Step::AddIteration { .. } => "add_iteration",
            Step::CancelAdd { .. } => "cancel_add",
        }
    }
}

/// A replay script: optional seed modules plus the steps to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub modules: Vec<Module>,
    pub steps: Vec<Step>,
}

/// Load and validate a script from disk.
pub fn load_script(path: &Path) -> Result<Script> {
    debug!(path = %path.display(), "loading script");
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read script {}", path.display()))?;
    parse_script(&contents).with_context(|| format!("load script {}", path.display()))
}

/// Parse a script and validate it against the embedded v1 schema.
pub fn parse_script(raw: &str) -> Result<Script> {
    let value: Value = serde_json::from_str(raw).context("parse script json")?;
    validate_schema(&value)?;
    let script: Script = serde_json::from_value(value).context("deserialize script")?;
    debug!(
        modules = script.modules.len(),
        steps = script.steps.len(),
        "script parsed"
    );
    Ok(script)
}

fn validate_schema(script: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(SCRIPT_SCHEMA).context("parse embedded script schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(script) {
        let messages = compiled
            .iter_errors(script)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "script schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
