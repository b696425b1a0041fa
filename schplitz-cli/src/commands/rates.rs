//! Rates command - current exchange rates against EUR

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use schplitz_core::Currency;

use super::{get_context, PendingRates};
use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let rates = PendingRates::start(&ctx)?.wait();

    if json {
        println!("{}", serde_json::to_string_pretty(&rates)?);
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Currency", "Name", "Per 1 EUR"]);
    for currency in Currency::ALL {
        let rate = rates
            .get(currency)
            .unwrap_or_else(|| currency.fallback_rate());
        table.add_row(vec![
            Cell::new(format!("{} {}", currency.code(), currency.symbol())),
            Cell::new(currency.name()),
            Cell::new(rate.round_dp(4)).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
    println!("{}", format!("Source: {} ({})", rates.source, ctx.rate_service.provider_name()).dimmed());
    Ok(())
}
