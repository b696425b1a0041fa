//! Database migrations - embedded SQL files
//!
//! Two databases, two migration sets: the ledger store (`schplitz.duckdb`)
//! and the event log (`logs.duckdb`). SQL files are compiled in with
//! include_str! and applied in name order.
//!
//! When adding a migration, create `NNN_description.sql` next to the others
//! and append it to the matching list. Each set must start with its
//! `000_migrations.sql` bootstrap.

/// A named SQL migration
pub type Migration = (&'static str, &'static str);

/// Name of the bootstrap migration every set starts with
pub const BOOTSTRAP: &str = "000_migrations.sql";

/// Ledger store migrations
pub const MIGRATIONS: &[Migration] = &[
    (BOOTSTRAP, include_str!("000_migrations.sql")),
    ("001_snapshots.sql", include_str!("001_snapshots.sql")),
];

/// Event log migrations
pub const LOG_MIGRATIONS: &[Migration] = &[
    (BOOTSTRAP, include_str!("logs/000_migrations.sql")),
    ("001_event_log.sql", include_str!("logs/001_event_log.sql")),
];
