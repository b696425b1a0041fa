//! Balance command - who owes whom

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use schplitz_core::domain::BASE_CURRENCY;
use schplitz_core::services::ledger::summary_of;
use schplitz_core::{RateSource, Settlement};

use super::{get_context, PendingRates};
use crate::output::{create_table, money_cell, warning};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let rates = PendingRates::start(&ctx)?;
    let snapshot = ctx.ledger_service.load()?;
    let rates = rates.wait();

    let summary = summary_of(&snapshot, &rates);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "summary": summary,
                "rates": rates.source,
            }))?
        );
        return Ok(());
    }

    let Some(summary) = summary else {
        warning("No balance yet: set both names with 'sz setup', or import your partner's expenses.");
        return Ok(());
    };

    let mut table = create_table();
    table.set_header(vec!["Paid by", "Total (EUR)"]);
    table.add_row(vec![Cell::new(&summary.name_a), money_cell(summary.total_a, BASE_CURRENCY)]);
    table.add_row(vec![Cell::new(&summary.name_b), money_cell(summary.total_b, BASE_CURRENCY)]);
    println!("{}", table);

    match summary.settlement() {
        Settlement::Settled => println!("{}", "All settled up".green().bold()),
        Settlement::Owes { debtor, creditor, amount } => println!(
            "{} owes {} {}",
            debtor.as_str().bold(),
            creditor.as_str().bold(),
            BASE_CURRENCY.format(amount).as_str().bold()
        ),
    }

    if rates.source == RateSource::Fallback {
        println!("{}", "Using offline exchange rates".dimmed());
    }
    Ok(())
}
