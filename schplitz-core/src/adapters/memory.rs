//! In-memory adapters for tests and offline use

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::ports::{LedgerStore, RateProvider};

/// Ledger store backed by a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| Error::storage("Store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| Error::storage("Store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| Error::storage("Store lock poisoned"))?;
        values.remove(key);
        Ok(())
    }
}

/// Rate provider returning a fixed answer.
///
/// `None` behaves like an unreachable rate server.
#[derive(Debug, Clone, Default)]
pub struct StaticRateProvider {
    rates: Option<HashMap<String, f64>>,
}

impl StaticRateProvider {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates: Some(rates) }
    }

    /// Provider that never has rates
    pub fn unavailable() -> Self {
        Self { rates: None }
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_rates(&self) -> Option<HashMap<String, f64>> {
        self.rates.clone()
    }
}
