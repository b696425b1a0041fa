//! Port definitions (trait interfaces)
//!
//! Ports define the boundaries between the core and the outside world.
//! Adapters implement these traits.

mod ledger_store;
mod rate_provider;

pub use ledger_store::{LedgerStore, LEDGER_STORAGE_KEY};
pub use rate_provider::RateProvider;
