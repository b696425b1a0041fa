//! Remove command - delete an expense permanently

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use schplitz_core::services::{LogEvent, LoggingService};

use super::{get_context, log_event};

pub fn run(id: &str, force: bool, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;
    let snapshot = ctx.ledger_service.load()?;

    // Accept any unambiguous prefix, as shown by 'sz list'
    let matches: Vec<_> = snapshot
        .expenses
        .entries()
        .iter()
        .filter(|e| e.id.starts_with(id))
        .collect();

    let expense = match matches.as_slice() {
        [] => anyhow::bail!("No expense with id '{}'", id),
        [one] => *one,
        _ => anyhow::bail!("'{}' matches {} expenses; use more of the id", id, matches.len()),
    };

    if !force {
        println!(
            "\n{}",
            format!(
                "This will delete '{}' ({}). Your partner's copy is not affected.",
                expense.description,
                expense.currency.format(expense.amount)
            )
            .yellow()
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

    ctx.ledger_service.remove_expense(&expense.id)?;
    log_event(logger, LogEvent::new("expense_removed").with_command("remove"));
    println!("{} Expense removed", "✓".green());
    Ok(())
}
