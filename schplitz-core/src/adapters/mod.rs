//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the LedgerStore port
//! - Frankfurter HTTP client for the RateProvider port
//! - In-memory store and fixed rates for tests and offline use

pub mod duckdb;
pub mod frankfurter;
pub mod memory;

#[cfg(test)]
pub mod frankfurter_mock;

pub use self::duckdb::DuckDbLedgerStore;
pub use self::frankfurter::FrankfurterRateProvider;
pub use self::memory::{MemoryLedgerStore, StaticRateProvider};
