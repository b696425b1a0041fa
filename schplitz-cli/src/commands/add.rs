//! Add command - record a shared expense

use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use rust_decimal::Decimal;
use schplitz_core::services::{LogEvent, LoggingService};
use schplitz_core::{Currency, Expense};

use super::{get_context, log_event};

pub fn run(
    description: &str,
    amount: Decimal,
    currency: Currency,
    paid_by: Option<String>,
    date: Option<NaiveDate>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let snapshot = ctx.ledger_service.load()?;

    let paid_by = match paid_by {
        Some(p) => p,
        None if !snapshot.my_name.is_empty() => snapshot.my_name.clone(),
        None => anyhow::bail!("No payer given. Run 'sz setup' or pass --paid-by."),
    };
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let expense = Expense::new(description, amount, currency, &paid_by, date)?;
    ctx.ledger_service.add_expense(expense.clone())?;
    log_event(logger, LogEvent::new("expense_added").with_command("add"));

    if json {
        println!("{}", serde_json::to_string_pretty(&expense)?);
        return Ok(());
    }

    println!(
        "{} Added {} paid by {} ({})",
        "✓".green(),
        currency.format(expense.amount),
        expense.paid_by,
        expense.description
    );
    Ok(())
}
