//! Export command - encrypt the ledger into a share link

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use schplitz_core::services::{LogEvent, LoggingService};
use schplitz_core::ShareArtifact;

use super::{get_context, log_event, spinner};
use crate::output::{info, warning};

pub fn run(
    answer: Option<String>,
    out: Option<PathBuf>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;

    let request = ctx.ledger_service.export_request(answer.as_deref())?;
    let entries = request.entries.len();

    let pb = spinner("Encrypting ledger...", json);
    let result = ctx.exchange_service.export(&request);
    pb.finish_and_clear();

    let artifact = match result {
        Ok(a) => a,
        Err(e) => {
            log_event(
                logger,
                LogEvent::new("export_failed").with_command("export").with_error(e.kind()),
            );
            return Err(e.into());
        }
    };
    log_event(
        logger,
        LogEvent::new(if artifact.is_url() { "ledger_exported" } else { "ledger_exported_as_text" })
            .with_command("export"),
    );

    if let Some(path) = &out {
        std::fs::write(path, artifact.as_str())?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "artifact": artifact,
                "entries": entries,
                "file": out.as_ref().map(|p| p.display().to_string()),
            }))?
        );
        return Ok(());
    }

    match &artifact {
        ShareArtifact::Url(_) => info(&format!("Share link for {} expenses:", entries)),
        ShareArtifact::Text(_) => warning(&format!(
            "{} expenses are too many for a link; share this text instead:",
            entries
        )),
    }
    match &out {
        Some(path) => println!("{} Written to {}", "✓".green(), path.display()),
        None => println!("{}", artifact.as_str()),
    }
    Ok(())
}
