//! CLI command implementations

pub mod add;
pub mod balance;
pub mod export;
pub mod import;
pub mod list;
pub mod logs;
pub mod rates;
pub mod remove;
pub mod reset;
pub mod setup;
pub mod status;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use schplitz_core::services::{EntryPoint, LogEvent, LoggingService};
use schplitz_core::{RateTable, SchplitzContext};

/// Env var holding the answer for non-interactive export/import
pub const ANSWER_ENV: &str = "SCHPLITZ_ANSWER";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let dir = get_schplitz_dir().ok()?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Data directory from `SCHPLITZ_DIR`, or `~/.schplitz`
pub fn get_schplitz_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SCHPLITZ_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".schplitz"))
}

/// Open the context for the data directory
pub fn get_context() -> Result<SchplitzContext> {
    let dir = get_schplitz_dir()?;
    SchplitzContext::new(&dir)
        .with_context(|| format!("Failed to open ledger in {}", dir.display()))
}

/// Answer from `--answer`, `SCHPLITZ_ANSWER`, or an interactive prompt
pub fn get_answer_or_prompt(answer_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(a) = answer_flag {
        return Ok(a);
    }
    if let Ok(a) = std::env::var(ANSWER_ENV) {
        return Ok(a);
    }
    let a = Password::new().with_prompt(prompt).interact()?;
    Ok(a)
}

/// Spinner on stderr while key derivation runs; hidden for JSON output
pub fn spinner(message: &str, json: bool) -> ProgressBar {
    if json {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A rate lookup running in the background while a command does other work
pub struct PendingRates {
    runtime: tokio::runtime::Runtime,
    handle: tokio::task::JoinHandle<RateTable>,
}

impl PendingRates {
    /// Start fetching rates on a small worker runtime
    pub fn start(ctx: &SchplitzContext) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let handle = {
            let _guard = runtime.enter();
            ctx.rate_service.spawn_load()
        };
        Ok(Self { runtime, handle })
    }

    /// Wait for the lookup. Never fails; a crashed task means fallback rates.
    pub fn wait(self) -> RateTable {
        self.runtime.block_on(self.handle).unwrap_or_default()
    }
}
