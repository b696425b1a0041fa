//! List command - show the ledger

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;

use super::get_context;
use crate::output::{create_table, money_cell, short_id};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let snapshot = ctx.ledger_service.load()?;
    let entries = snapshot.expenses.entries();

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No expenses yet. Add one with 'sz add'.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Paid by"]);
    for e in entries {
        table.add_row(vec![
            Cell::new(short_id(&e.id)),
            Cell::new(e.date.format("%Y-%m-%d")),
            Cell::new(&e.description),
            money_cell(e.amount, e.currency),
            Cell::new(&e.paid_by),
        ]);
    }

    println!("{}", table);
    println!("{}", format!("{} expenses", entries.len()).dimmed());
    Ok(())
}
