//! Setup command - names and the shared security question

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::get_context;
use crate::output::success;

pub fn run(
    name: Option<String>,
    partner: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    share_url: Option<String>,
) -> Result<()> {
    let mut ctx = get_context()?;
    let ledger = &ctx.ledger_service;
    let current = ledger.load()?;
    let interactive = name.is_none()
        && partner.is_none()
        && question.is_none()
        && answer.is_none()
        && share_url.is_none();

    let share_url = match share_url.as_deref().map(str::trim) {
        Some(url) if url::Url::parse(url).is_err() => {
            anyhow::bail!("Not a valid link prefix: {}", url)
        }
        other => other.map(str::to_string),
    };

    let name = match name {
        Some(n) => Some(n),
        None if interactive => Some(
            Input::new()
                .with_prompt("Your name")
                .with_initial_text(current.my_name.clone())
                .interact_text()?,
        ),
        None => None,
    };
    let partner = match partner {
        Some(p) => Some(p),
        None if interactive => Some(
            Input::new()
                .with_prompt("Partner's name")
                .with_initial_text(current.other_name.clone().unwrap_or_default())
                .allow_empty(true)
                .interact_text()?,
        ),
        None => None,
    };
    let question = match question {
        Some(q) => Some(q),
        None if interactive => Some(
            Input::new()
                .with_prompt("Security question (both of you must know the answer)")
                .with_initial_text(
                    current
                        .security
                        .as_ref()
                        .map(|s| s.question.clone())
                        .unwrap_or_default(),
                )
                .interact_text()?,
        ),
        None => None,
    };

    // An answer alone replaces the answer to the existing question
    let question = question.or_else(|| {
        answer
            .as_ref()
            .and(current.security.as_ref())
            .map(|s| s.question.clone())
    });
    if question.is_none() && answer.is_some() {
        anyhow::bail!("No security question set yet; pass --question as well");
    }

    if let Some(name) = name {
        ledger.set_my_name(&name)?;
    }
    if let Some(partner) = partner {
        ledger.set_other_name(&partner)?;
    }
    if let Some(question) = question {
        let answer = match answer {
            Some(a) => a,
            None => Password::new()
                .with_prompt("Answer")
                .with_confirmation("Confirm answer", "Answers do not match")
                .interact()?,
        };
        ledger.set_security(&question, &answer)?;
    }

    if let Some(url) = share_url {
        ctx.config.share_base_url = url;
        ctx.config.save(&ctx.data_dir)?;
    }

    let snapshot = ctx.ledger_service.load()?;
    success("✓ Setup saved");
    println!("  You:      {}", snapshot.my_name);
    println!(
        "  Partner:  {}",
        snapshot.partner_name().unwrap_or_else(|| "(not set)".dimmed().to_string())
    );
    if let Some(security) = &snapshot.security {
        println!("  Question: {}", security.question);
    }
    println!("  Links:    {}", ctx.config.share_base_url);

    Ok(())
}
