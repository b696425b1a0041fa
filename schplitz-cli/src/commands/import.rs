//! Import command - merge a partner's share into the ledger

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use schplitz_core::services::{peek_question, LogEvent, LoggingService};
use schplitz_core::{Error, ImportOutcome};

use super::{get_answer_or_prompt, get_context, log_event, spinner};
use crate::output::status_label;

fn read_input(input: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = input {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(&path)?);
    }
    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    let text: String = Input::new()
        .with_prompt("Paste the share link or data")
        .interact_text()?;
    Ok(text)
}

/// Log the category, then replace the error with the one-line user message
fn fail(logger: &Option<LoggingService>, e: Error) -> anyhow::Error {
    log_event(
        logger,
        LogEvent::new("import_failed").with_command("import").with_error(e.kind()),
    );
    anyhow::anyhow!(e.user_message())
}

pub fn run(
    input: Option<String>,
    file: Option<PathBuf>,
    answer: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let text = read_input(input, file)?;

    let question = peek_question(&text).map_err(|e| fail(logger, e))?;
    let prompt = question.unwrap_or_else(|| "Answer".to_string());
    if !json {
        println!("{} {}", "Question:".bold(), prompt);
    }
    let answer = get_answer_or_prompt(answer, &prompt)?;

    let pb = spinner("Decrypting...", json);
    let decoded = ctx.exchange_service.import(&text, &answer);
    pb.finish_and_clear();
    let decoded = decoded.map_err(|e| fail(logger, e))?;

    let outcome = ctx.ledger_service.import_share(&decoded)?;
    log_event(
        logger,
        LogEvent::new(format!("ledger_imported_v{}", decoded.version)).with_command("import"),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "version": decoded.version,
                "received": decoded.entries.len(),
                "inserted": outcome.inserted(),
                "partnerStatus": decoded.status,
            }))?
        );
        return Ok(());
    }

    match outcome {
        ImportOutcome::Imported(n) => {
            println!("{} Imported {} new expenses", "✓".green(), n)
        }
        ImportOutcome::NothingNew => println!("{}", "No new expenses to import".dimmed()),
    }
    if let (Some(names), Some(status)) = (&decoded.names, decoded.status) {
        println!("  From {} and {}, sender is {}", names[0], names[1], status_label(status));
    }
    Ok(())
}
