//! Lab configuration stored as TOML (default `iterlab.toml`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::numbering::Numbering;
use crate::core::store::StoreSettings;

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "iterlab.toml";

/// Lab configuration (TOML).
///
/// Missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabConfig {
    /// Simulated duration of the external iteration-creation call.
    pub add_delay_ms: u64,

    /// Title shown while an iteration is being added.
    pub placeholder_title: String,

    /// Title given to a completed iteration when none was entered.
    pub fallback_title: String,

    /// Prefix for generated module titles (`"<prefix> <id>"`).
    pub module_title_prefix: String,

    /// Iteration id policy: `length` or `monotonic`.
    pub numbering: Numbering,
}

impl Default for LabConfig {
    fn default() -> Self {
        let settings = StoreSettings::default();
        Self {
            add_delay_ms: 1_500,
            placeholder_title: settings.placeholder_title,
            fallback_title: settings.fallback_title,
            module_title_prefix: settings.module_title_prefix,
            numbering: settings.numbering,
        }
    }
}

impl LabConfig {
    pub fn validate(&self) -> Result<()> {
        if self.placeholder_title.trim().is_empty() {
            return Err(anyhow!("placeholder_title must be non-empty"));
        }
        if self.fallback_title.trim().is_empty() {
            return Err(anyhow!("fallback_title must be non-empty"));
        }
        if self.module_title_prefix.trim().is_empty() {
            return Err(anyhow!("module_title_prefix must be non-empty"));
        }
        Ok(())
    }

    pub fn add_delay(&self) -> Duration {
        Duration::from_millis(self.add_delay_ms)
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            numbering: self.numbering,
            placeholder_title: self.placeholder_title.clone(),
            fallback_title: self.fallback_title.clone(),
            module_title_prefix: self.module_title_prefix.clone(),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LabConfig::default()`.
pub fn load_config(path: &Path) -> Result<LabConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = LabConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LabConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), numbering = ?cfg.numbering, "config loaded");
    Ok(cfg)
}

/// Validate `cfg` and write it to `path`; a reader never sees a half-written file.
pub fn write_config(path: &Path, cfg: &LabConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    stage_and_replace(path, &buf)
}

/// Stage `contents` in a hidden sibling of `path`, then rename it over `path`.
/// A failed rename removes the staged file.
fn stage_and_replace(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("config path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create config dir {}", dir.display()))?;

    let staged = dir.join(format!(".{}.partial", file_name.to_string_lossy()));
    fs::write(&staged, contents).with_context(|| format!("stage {}", staged.display()))?;
    if let Err(err) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(err).with_context(|| format!("move config into {}", path.display()));
    }
    debug!(path = %path.display(), "config written");
    Ok(())
}
