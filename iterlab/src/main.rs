//! Experiment module/iteration state tool.
//!
//! Replays scripted user intents against the module store and prints the
//! resulting snapshot, so rendering collaborators and tests can share fixtures.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use iterlab::core::classifier::classify_title;
use iterlab::exit_codes;
use iterlab::io::config::{DEFAULT_CONFIG_PATH, LabConfig, load_config, write_config};
use iterlab::io::script::load_script;
use iterlab::logging;
use iterlab::replay::replay_script;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "iterlab",
    version,
    about = "Replay and inspect experiment module/iteration state"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a JSON script of steps and print the final snapshot as JSON.
    Replay {
        /// Path to the script.
        script: PathBuf,
        /// Config file (defaults are used when it does not exist).
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Print the length category of an iteration title.
    Classify { title: String },
    /// Write the default config file.
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init(logging::DEFAULT_FILTER);
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay { script, config } => cmd_replay(&script, &config),
        Command::Classify { title } => {
            println!("{}", classify_title(&title));
            Ok(exit_codes::OK)
        }
        Command::InitConfig { path, force } => cmd_init_config(&path, force),
    }
}

fn cmd_replay(script_path: &Path, config_path: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let script = load_script(script_path)?;
    let report = replay_script(script, &config)?;
    info!(
        modules = report.modules.len(),
        ignored = report.ignored.len(),
        "replay finished"
    );

    let mut payload = serde_json::to_string_pretty(&report).context("serialize report")?;
    payload.push('\n');
    print!("{}", payload);

    if report.violations.is_empty() {
        return Ok(exit_codes::OK);
    }
    for violation in &report.violations {
        warn!(%violation, "snapshot invariant violated");
    }
    eprintln!(
        "invariant violations:\n- {}",
        report.violations.join("\n- ")
    );
    Ok(exit_codes::VIOLATIONS)
}

fn cmd_init_config(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    write_config(path, &LabConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(exit_codes::OK)
}
