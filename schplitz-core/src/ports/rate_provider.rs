//! Exchange rate provider port

use std::collections::HashMap;

use async_trait::async_trait;

/// Source of exchange rates relative to EUR.
///
/// The contract has two outcomes only: a mapping from currency code to rate,
/// or nothing usable. Errors are the provider's to swallow.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Provider name for diagnostics (e.g., "frankfurter")
    fn name(&self) -> &str;

    /// Fetch current rates keyed by currency code
    async fn fetch_rates(&self) -> Option<HashMap<String, f64>>;
}
