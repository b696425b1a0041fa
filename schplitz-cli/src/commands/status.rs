//! Status command - own and partner progress

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use schplitz_core::services::{LogEvent, LoggingService};
use schplitz_core::ShareStatus;

use super::{get_context, log_event};
use crate::output::status_label;

#[derive(Subcommand)]
pub enum StatusCommands {
    /// Set your own status (just_started, almost_done, done)
    Set {
        status: ShareStatus,
    },
}

pub fn run(
    command: Option<StatusCommands>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;

    if let Some(StatusCommands::Set { status }) = command {
        ctx.ledger_service.set_status(status)?;
        log_event(logger, LogEvent::new("status_changed").with_command("status"));
    }

    let snapshot = ctx.ledger_service.load()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "myName": snapshot.my_name,
                "otherName": snapshot.partner_name(),
                "status": snapshot.status,
                "partnerStatus": snapshot.partner_status,
                "expenses": snapshot.expenses.len(),
                "securityConfigured": snapshot.security.is_some(),
            }))?
        );
        return Ok(());
    }

    let me = if snapshot.my_name.is_empty() { "You" } else { snapshot.my_name.as_str() };
    println!("{}", "Status".bold());
    println!("  {:<12} {}", me, status_label(snapshot.status));

    let partner = snapshot.partner_name().unwrap_or_else(|| "Partner".to_string());
    match snapshot.partner_status {
        Some(status) => println!("  {:<12} {}", partner, status_label(status)),
        None => println!("  {:<12} {}", partner, "no share received yet".dimmed()),
    }

    println!();
    println!("{} expenses in your ledger", snapshot.expenses.len());
    if snapshot.security.is_none() {
        println!("{}", "No security question set. Run 'sz setup' before sharing.".yellow());
    }
    Ok(())
}
