//! Service layer - business logic orchestration
//!
//! Codecs (crypto, transport) are plain functions; services coordinate
//! domain logic and port interactions.

pub mod crypto;
pub mod exchange;
pub mod ledger;
pub mod logging;
pub mod migration;
pub mod rates;
pub mod transport;

pub use exchange::{
    peek_question, DecodedShare, ExchangeService, ExportRequest, ShareArtifact, ShareInput,
};
pub use ledger::{ImportOutcome, LedgerService};
pub use logging::{EntryPoint, EventCount, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use rates::RateService;
