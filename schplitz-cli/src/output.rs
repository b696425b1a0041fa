//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;
use schplitz_core::{Currency, ShareStatus};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Right-aligned money cell
pub fn money_cell(amount: Decimal, currency: Currency) -> Cell {
    Cell::new(currency.format(amount)).set_alignment(CellAlignment::Right)
}

/// Coloured status label
pub fn status_label(status: ShareStatus) -> String {
    match status {
        ShareStatus::JustStarted => status.label().dimmed().to_string(),
        ShareStatus::AlmostDone => status.label().yellow().to_string(),
        ShareStatus::Done => status.label().green().to_string(),
    }
}

/// First eight characters of an id, enough to tell entries apart
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
