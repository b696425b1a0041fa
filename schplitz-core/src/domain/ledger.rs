//! Ledger, persisted snapshot and the merge engine

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::envelope::ShareStatus;
use super::expense::Expense;

/// Ordered collection of expenses, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<Expense>,
}

impl Ledger {
    pub fn new(entries: Vec<Expense>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Expense] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Add a locally created expense at the front
    pub fn add(&mut self, expense: Expense) {
        self.entries.insert(0, expense);
    }

    /// Remove an expense permanently. Returns false if the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Union incoming entries into this ledger by id.
    ///
    /// Existing ids are never overwritten. Entries with an empty id, or whose
    /// id already appeared earlier in the incoming batch, are skipped.
    /// Survivors are appended after the local entries.
    pub fn merge(&self, incoming: &[Expense]) -> (Ledger, usize) {
        let mut seen: HashSet<&str> = self.entries.iter().map(|e| e.id.as_str()).collect();
        let mut merged = self.entries.clone();
        let mut inserted = 0;

        for expense in incoming {
            if expense.id.is_empty() || !seen.insert(expense.id.as_str()) {
                continue;
            }
            merged.push(expense.clone());
            inserted += 1;
        }

        (Ledger { entries: merged }, inserted)
    }

    /// Distinct payer names other than `me`, in first-seen order
    pub fn other_payers(&self, me: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.paid_by.as_str())
            .filter(|p| !p.is_empty() && *p != me)
            .filter(|p| seen.insert(*p))
            .map(str::to_string)
            .collect()
    }
}

/// Shared question and the normalized answer used for exports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    pub question: String,
    /// Always stored normalized
    pub answer: String,
}

/// Everything persisted for one device, stored under a fixed key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub my_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_name: Option<String>,
    #[serde(default)]
    pub status: ShareStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_status: Option<ShareStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecuritySettings>,
    #[serde(default)]
    pub expenses: Ledger,
}

impl LedgerSnapshot {
    /// The partner's name: the explicit one if set, otherwise the single
    /// distinct payer in the ledger that isn't us.
    pub fn partner_name(&self) -> Option<String> {
        if let Some(name) = self.other_name.as_ref().filter(|n| !n.trim().is_empty()) {
            return Some(name.clone());
        }
        let others = self.expenses.other_payers(&self.my_name);
        if others.len() == 1 {
            others.into_iter().next()
        } else {
            None
        }
    }

    /// Both participant names, ours first, when both are known
    pub fn participants(&self) -> Option<[String; 2]> {
        if self.my_name.trim().is_empty() {
            return None;
        }
        let partner = self.partner_name()?;
        Some([self.my_name.clone(), partner])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn expense(id: &str, paid_by: &str) -> Expense {
        Expense {
            id: id.to_string(),
            description: format!("item {}", id),
            amount: Decimal::new(1000, 2),
            currency: Currency::Eur,
            paid_by: paid_by.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    fn ids(ledger: &Ledger) -> Vec<&str> {
        ledger.entries().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_merge_adds_only_unseen_ids() {
        let local = Ledger::new(vec![expense("a", "Ana"), expense("b", "Ana")]);
        let mut changed = expense("a", "Ben");
        changed.description = "tampered".to_string();

        let (merged, inserted) = local.merge(&[changed, expense("c", "Ben")]);

        assert_eq!(inserted, 1);
        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged.entries()[0].description, "item a");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let local = Ledger::new(vec![expense("a", "Ana")]);
        let incoming = vec![expense("b", "Ben"), expense("c", "Ben")];

        let (once, first) = local.merge(&incoming);
        let (twice, second) = once.merge(&incoming);

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_commutes_for_disjoint_batches() {
        let local = Ledger::new(vec![expense("a", "Ana")]);
        let batch_a = vec![expense("b", "Ben")];
        let batch_b = vec![expense("c", "Ben"), expense("d", "Ana")];

        let (ab, _) = local.merge(&batch_a).0.merge(&batch_b);
        let (ba, _) = local.merge(&batch_b).0.merge(&batch_a);

        let mut left = ids(&ab);
        let mut right = ids(&ba);
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn test_merge_skips_empty_and_repeated_ids() {
        let local = Ledger::default();
        let (merged, inserted) = local.merge(&[expense("", "Ben"), expense("x", "Ben"), expense("x", "Ana")]);
        assert_eq!(inserted, 1);
        assert_eq!(merged.entries()[0].paid_by, "Ben");
    }

    #[test]
    fn test_merge_nothing_new() {
        let local = Ledger::new(vec![expense("a", "Ana")]);
        let (merged, inserted) = local.merge(&[expense("a", "Ana")]);
        assert_eq!(inserted, 0);
        assert_eq!(merged, local);
    }

    #[test]
    fn test_add_and_remove() {
        let mut ledger = Ledger::new(vec![expense("a", "Ana")]);
        ledger.add(expense("b", "Ana"));
        assert_eq!(ids(&ledger), vec!["b", "a"]);
        assert!(ledger.remove("a"));
        assert!(!ledger.remove("a"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_partner_name_derivation() {
        let mut snapshot = LedgerSnapshot {
            my_name: "Ana".to_string(),
            expenses: Ledger::new(vec![expense("a", "Ana"), expense("b", "Ben")]),
            ..Default::default()
        };
        assert_eq!(snapshot.partner_name().as_deref(), Some("Ben"));

        snapshot.expenses.add(expense("c", "Cid"));
        assert_eq!(snapshot.partner_name(), None);

        snapshot.other_name = Some("Ben".to_string());
        assert_eq!(snapshot.participants(), Some(["Ana".to_string(), "Ben".to_string()]));
    }

    #[test]
    fn test_snapshot_defaults_from_sparse_json() {
        let snapshot: LedgerSnapshot =
            serde_json::from_str(r#"{"myName":"Ana","expenses":[]}"#).unwrap();
        assert_eq!(snapshot.my_name, "Ana");
        assert_eq!(snapshot.status, ShareStatus::JustStarted);
        assert!(snapshot.expenses.is_empty());
        assert!(snapshot.security.is_none());
    }
}
