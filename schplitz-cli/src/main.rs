//! Schplitz CLI - split expenses with one other person, no cloud

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use schplitz_core::services::{LogEvent, LoggingService};
use schplitz_core::Currency;

mod commands;
mod output;

use commands::{
    add, balance, export, get_logger, import, list, log_event, logs, rates, remove, reset, setup,
    status,
};

/// Schplitz - shared expenses for two, reconciled by link
#[derive(Parser)]
#[command(name = "sz", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set names and the shared security question
    Setup {
        /// Your name
        #[arg(long)]
        name: Option<String>,
        /// Your partner's name
        #[arg(long)]
        partner: Option<String>,
        /// Question both of you can answer
        #[arg(long)]
        question: Option<String>,
        /// Answer to the question (prompted if omitted)
        #[arg(long)]
        answer: Option<String>,
        /// Link prefix for exported shares, saved to settings.json
        #[arg(long)]
        share_url: Option<String>,
    },

    /// Record a shared expense
    Add {
        /// What it was for
        description: String,
        /// Amount in the expense currency
        amount: Decimal,
        /// Currency code (EUR, USD, ALL, AED, NOK, SEK, THB)
        #[arg(short, long, default_value = "EUR")]
        currency: Currency,
        /// Who paid (defaults to you)
        #[arg(short, long)]
        paid_by: Option<String>,
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List expenses
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an expense
    Remove {
        /// Expense id or a unique prefix of it
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show who owes whom
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or set progress
    Status {
        #[command(subcommand)]
        command: Option<status::StatusCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encrypt the ledger into a share link
    Export {
        /// Answer to use instead of the stored one
        #[arg(long)]
        answer: Option<String>,
        /// Write the link or text to a file
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge a partner's share link or data
    Import {
        /// Link, token or raw JSON (reads stdin or prompts if omitted)
        input: Option<String>,
        /// Read the share from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Answer to the security question (or SCHPLITZ_ANSWER)
        #[arg(long)]
        answer: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show exchange rates against EUR
    Rates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Delete everything stored on this device
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Setup { .. } => "setup",
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Remove { .. } => "remove",
            Commands::Balance { .. } => "balance",
            Commands::Status { .. } => "status",
            Commands::Export { .. } => "export",
            Commands::Import { .. } => "import",
            Commands::Rates { .. } => "rates",
            Commands::Logs { .. } => "logs",
            Commands::Reset { .. } => "reset",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    let logger = if name == "logs" { None } else { get_logger() };
    log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let category = e
                .downcast_ref::<schplitz_core::Error>()
                .map(|core| core.kind())
                .unwrap_or("error");
            log_event(&logger, LogEvent::new("command_failed").with_command(name).with_error(category));
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: &Option<LoggingService>) -> Result<()> {
    match cli.command {
        Commands::Setup { name, partner, question, answer, share_url } => {
            setup::run(name, partner, question, answer, share_url)
        }
        Commands::Add { description, amount, currency, paid_by, date, json } => {
            add::run(&description, amount, currency, paid_by, date, json, logger)
        }
        Commands::List { json } => list::run(json),
        Commands::Remove { id, force } => remove::run(&id, force, logger),
        Commands::Balance { json } => balance::run(json),
        Commands::Status { command, json } => status::run(command, json, logger),
        Commands::Export { answer, out, json } => export::run(answer, out, json, logger),
        Commands::Import { input, file, answer, json } => import::run(input, file, answer, json, logger),
        Commands::Rates { json } => rates::run(json),
        Commands::Logs { command } => logs::run(command),
        Commands::Reset { force } => reset::run(force, logger),
    }
}
