//! Repeated open/close of the ledger store on one file
//!
//! Run with: cargo test --test connection_retry_test -- --nocapture

use std::time::Instant;

use tempfile::TempDir;

use schplitz_core::adapters::duckdb::{DuckDbLedgerStore, DB_FILENAME};
use schplitz_core::ports::{LedgerStore, LEDGER_STORAGE_KEY};

/// Each CLI invocation opens and drops its own store
#[test]
fn test_sequential_connections() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(DB_FILENAME);

    for i in 0..5 {
        let start = Instant::now();
        let store = DuckDbLedgerStore::open(&db_path).unwrap();
        println!("Connection {}: opened in {:?}", i, start.elapsed());
        assert!(store.run_migrations().unwrap().applied.is_empty() || i == 0);
    }
}

/// Writes from one short-lived store are visible to the next
#[test]
fn test_rapid_open_write_close_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(DB_FILENAME);

    for i in 0..10 {
        let store = DuckDbLedgerStore::open(&db_path).unwrap();
        let previous = store.load(LEDGER_STORAGE_KEY).unwrap();
        if i == 0 {
            assert!(previous.is_none());
        } else {
            assert_eq!(previous, Some(format!("{{\"n\":{}}}", i - 1)));
        }
        store
            .save(LEDGER_STORAGE_KEY, &format!("{{\"n\":{}}}", i))
            .unwrap();
    }
}

#[test]
fn test_open_creates_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(DB_FILENAME);
    assert!(!db_path.exists());

    let store = DuckDbLedgerStore::open(&db_path).unwrap();
    assert!(db_path.exists());
    assert_eq!(store.load(LEDGER_STORAGE_KEY).unwrap(), None);
}

#[test]
fn test_open_in_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("missing").join(DB_FILENAME);
    assert!(DuckDbLedgerStore::open(&db_path).is_err());
}
