//! Schplitz Core - shared expense ledgers for two people
//!
//! Two parties keep separate ledgers and reconcile by passing one encrypted,
//! versioned payload back and forth. This crate follows a hexagonal layout:
//!
//! - **domain**: Expense, Ledger, envelopes, balances (no I/O)
//! - **ports**: traits for persistence and exchange rates
//! - **services**: crypto and transport codecs, exchange protocol, ledger
//!   operations, rates, logging
//! - **adapters**: DuckDB store, Frankfurter client, in-memory doubles

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::{DuckDbLedgerStore, DB_FILENAME};
use adapters::FrankfurterRateProvider;
use config::Config;
use ports::{LedgerStore, RateProvider};
use services::{ExchangeService, LedgerService, RateService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, GENERIC_DECRYPT_MESSAGE};
pub use domain::{
    BalanceSummary, Currency, Expense, Ledger, LedgerSnapshot, RateSource, RateTable, Settlement,
    ShareStatus,
};
pub use services::{DecodedShare, ExportRequest, ImportOutcome, ShareArtifact};

/// Application state, owned explicitly by the caller
pub struct SchplitzContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub ledger_service: LedgerService,
    pub exchange_service: ExchangeService,
    pub rate_service: RateService,
}

impl SchplitzContext {
    /// Open the DuckDB store in `data_dir` and wire the live rate provider
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;

        let store = Arc::new(DuckDbLedgerStore::open(&data_dir.join(DB_FILENAME))?);
        let provider = Arc::new(FrankfurterRateProvider::new(
            &config.rates_url,
            config.rates_timeout_secs,
        )?);

        Ok(Self::with_parts(data_dir, config, store, provider))
    }

    /// Assemble a context from explicit collaborators
    pub fn with_parts(
        data_dir: &Path,
        config: Config,
        store: Arc<dyn LedgerStore>,
        provider: Arc<dyn RateProvider>,
    ) -> Self {
        Self {
            ledger_service: LedgerService::new(store),
            exchange_service: ExchangeService::from_config(&config),
            rate_service: RateService::new(provider).offline(config.offline),
            data_dir: data_dir.to_path_buf(),
            config,
        }
    }
}
