//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod balance;
pub mod currency;
pub mod envelope;
pub mod expense;
pub mod ledger;
pub mod result;

pub use balance::{summarize, BalanceSummary, Settlement};
pub use currency::{to_base, Currency, RateSource, RateTable, BASE_CURRENCY};
pub use envelope::{Envelope, EnvelopeV1, EnvelopeV2, EnvelopeV3, PayloadV3, ShareStatus, CURRENT_VERSION};
pub use expense::{CompactExpense, Expense};
pub use ledger::{Ledger, LedgerSnapshot, SecuritySettings};
