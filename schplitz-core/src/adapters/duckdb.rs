//! DuckDB-backed ledger store

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use duckdb::{params, Connection};

use crate::domain::result::{Error, Result};
use crate::migrations::MIGRATIONS;
use crate::ports::LedgerStore;
use crate::services::{MigrationResult, MigrationService};

/// File name of the ledger database inside the data directory
pub const DB_FILENAME: &str = "schplitz.duckdb";

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds, doubled on each retry
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// True when an open error looks like another process holding the file
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// Snapshot store over a single DuckDB file.
///
/// Each key holds one JSON document. A save is one `INSERT OR REPLACE`, so
/// readers see either the old or the new snapshot.
pub struct DuckDbLedgerStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbLedgerStore {
    /// Open (or create) the store at `db_path` and run pending migrations.
    ///
    /// Lock errors are retried with exponential backoff, since the CLI and
    /// another instance may start at the same moment.
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    let store = Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    };
                    store.run_migrations()?;
                    return Ok(store);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[schplitz] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Store that lives only as long as the value, for tests
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn try_open_connection(db_path: &Path) -> anyhow::Result<Connection> {
        // Autoloading would pull cached extensions from ~/.duckdb
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Apply the ledger migration set
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::storage("Database connection lock poisoned"))
    }
}

fn storage_err(e: duckdb::Error) -> Error {
    Error::storage(e.to_string())
}

impl LedgerStore for DuckDbLedgerStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        match conn.query_row(
            "SELECT payload FROM sys_snapshots WHERE storage_key = ?",
            [key],
            |row| row.get::<_, String>(0),
        ) {
            Ok(payload) => Ok(Some(payload)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO sys_snapshots (storage_key, payload, updated_at)
             VALUES (?, ?, current_timestamp)",
            params![key, value],
        )
        .map_err(storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM sys_snapshots WHERE storage_key = ?", [key])
            .map_err(storage_err)?;
        Ok(())
    }
}
