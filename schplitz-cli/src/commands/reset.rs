//! Reset command - wipe the local ledger

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use schplitz_core::services::{LogEvent, LoggingService};

use super::{get_context, log_event};

pub fn run(force: bool, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;

    if !force {
        println!(
            "\n{}",
            "This deletes your names, security question and every expense on this device.".yellow()
        );
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.ledger_service.reset()?;
    log_event(logger, LogEvent::new("ledger_reset").with_command("reset"));
    println!("{} Ledger reset", "✓".green());
    Ok(())
}
