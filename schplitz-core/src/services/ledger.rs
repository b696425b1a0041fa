//! Ledger service - the local snapshot and everything that changes it
//!
//! Every operation loads the whole snapshot, changes it in memory and saves
//! it back in one store call. A failing step leaves the stored snapshot as it
//! was.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::result::Error;
use crate::domain::{
    summarize, BalanceSummary, Expense, LedgerSnapshot, RateTable, SecuritySettings, ShareStatus,
};
use crate::ports::{LedgerStore, LEDGER_STORAGE_KEY};
use crate::services::crypto::normalize_answer;
use crate::services::exchange::{DecodedShare, ExportRequest};

/// Result of merging a share into the local ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "inserted", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// This many new entries were added
    Imported(usize),
    /// Every entry was already known
    NothingNew,
}

impl ImportOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            ImportOutcome::Imported(n) => *n,
            ImportOutcome::NothingNew => 0,
        }
    }
}

/// Owns reads and writes of the persisted snapshot
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Current snapshot, or an empty one if nothing is stored yet
    pub fn load(&self) -> Result<LedgerSnapshot> {
        match self.store.load(LEDGER_STORAGE_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Stored ledger is corrupted"),
            None => Ok(LedgerSnapshot::default()),
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.store.save(LEDGER_STORAGE_KEY, &json)?;
        Ok(())
    }

    fn update<T>(&self, change: impl FnOnce(&mut LedgerSnapshot) -> Result<T>) -> Result<T> {
        let mut snapshot = self.load()?;
        let out = change(&mut snapshot)?;
        self.save(&snapshot)?;
        Ok(out)
    }

    pub fn set_my_name(&self, name: &str) -> Result<()> {
        let name = required(name, "Your name")?;
        self.update(|s| {
            s.my_name = name;
            Ok(())
        })
    }

    /// Set the partner's name explicitly. An empty name clears it.
    pub fn set_other_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        self.update(|s| {
            s.other_name = (!name.is_empty()).then(|| name.to_string());
            Ok(())
        })
    }

    pub fn set_status(&self, status: ShareStatus) -> Result<()> {
        self.update(|s| {
            s.status = status;
            Ok(())
        })
    }

    /// Store the shared question with the answer in normalized form
    pub fn set_security(&self, question: &str, answer: &str) -> Result<()> {
        let question = required(question, "The security question")?;
        let answer = normalize_answer(answer);
        if answer.is_empty() {
            return Err(Error::validation("The answer cannot be empty").into());
        }
        self.update(|s| {
            s.security = Some(SecuritySettings { question, answer });
            Ok(())
        })
    }

    /// Add a locally created expense at the top of the ledger
    pub fn add_expense(&self, expense: Expense) -> Result<()> {
        self.update(|s| {
            if s.expenses.contains(&expense.id) {
                return Err(Error::validation(format!("Expense {} already exists", expense.id)).into());
            }
            s.expenses.add(expense);
            Ok(())
        })
    }

    /// Delete an expense permanently. False if the id was unknown.
    pub fn remove_expense(&self, id: &str) -> Result<bool> {
        let mut snapshot = self.load()?;
        if !snapshot.expenses.remove(id) {
            return Ok(false);
        }
        self.save(&snapshot)?;
        Ok(true)
    }

    /// Merge a decoded share into the local ledger.
    ///
    /// Records the partner's status and adopts their name when none is set.
    /// Our own status, name and security settings are never touched.
    pub fn import_share(&self, share: &DecodedShare) -> Result<ImportOutcome> {
        self.update(|s| {
            let (merged, inserted) = s.expenses.merge(&share.entries);
            s.expenses = merged;

            if let Some(status) = share.status {
                s.partner_status = Some(status);
            }
            if s.other_name.is_none() {
                if let Some(partner) = share.names.as_ref().and_then(|n| partner_of(n, &s.my_name)) {
                    s.other_name = Some(partner);
                }
            }

            Ok(if inserted == 0 {
                ImportOutcome::NothingNew
            } else {
                ImportOutcome::Imported(inserted)
            })
        })
    }

    /// Build an export request from the stored snapshot.
    ///
    /// `answer` overrides the stored answer when given.
    pub fn export_request(&self, answer: Option<&str>) -> Result<ExportRequest> {
        let snapshot = self.load()?;
        if snapshot.expenses.is_empty() {
            return Err(Error::validation("Nothing to export yet").into());
        }
        let names = snapshot
            .participants()
            .ok_or_else(|| Error::validation("Set both participant names before sharing"))?;
        let security = snapshot
            .security
            .as_ref()
            .ok_or_else(|| Error::validation("Set a security question before sharing"))?;

        Ok(ExportRequest {
            entries: snapshot.expenses.entries().to_vec(),
            question: security.question.clone(),
            answer: answer.map(str::to_string).unwrap_or_else(|| security.answer.clone()),
            names,
            status: snapshot.status,
        })
    }

    /// Delete everything stored for this device
    pub fn reset(&self) -> Result<()> {
        self.store.delete(LEDGER_STORAGE_KEY)?;
        Ok(())
    }

    /// Balance between us and the partner, if the partner is known
    pub fn summary(&self, rates: &RateTable) -> Result<Option<BalanceSummary>> {
        let snapshot = self.load()?;
        Ok(summary_of(&snapshot, rates))
    }
}

/// Balance for an already loaded snapshot
pub fn summary_of(snapshot: &LedgerSnapshot, rates: &RateTable) -> Option<BalanceSummary> {
    let [me, partner] = snapshot.participants()?;
    Some(summarize(snapshot.expenses.entries(), &me, &partner, rates))
}

fn required(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", what)).into());
    }
    Ok(value.to_string())
}

/// The entry of `names` that isn't `me`, when `me` is one of them
fn partner_of(names: &[String; 2], me: &str) -> Option<String> {
    match names {
        [a, b] if a == me && b != me => Some(b.clone()),
        [a, b] if b == me && a != me => Some(a.clone()),
        _ => None,
    }
}
