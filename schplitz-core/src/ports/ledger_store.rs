//! Ledger store port - persistence of the local snapshot

use crate::domain::result::Result;

/// Fixed key the local snapshot is stored under
pub const LEDGER_STORAGE_KEY: &str = "schplitzExpenses";

/// Key/value persistence for serialized snapshots.
///
/// Each call replaces or reads a whole value; implementations must never
/// expose a partially written one.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> Result<()>;
}
