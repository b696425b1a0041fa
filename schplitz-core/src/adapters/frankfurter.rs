//! Frankfurter exchange-rate client
//!
//! Fetches the latest EUR-based rates from the public Frankfurter API.
//! The API needs no key. Response shape:
//!
//! ```json
//! { "amount": 1.0, "base": "EUR", "date": "2025-01-10", "rates": { "USD": 1.03, ... } }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ports::RateProvider;

/// Default endpoint, EUR base
pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app/latest?from=EUR";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: Option<HashMap<String, f64>>,
}

/// Frankfurter API client
#[derive(Debug)]
pub struct FrankfurterRateProvider {
    client: Client,
    url: String,
    timeout_secs: u64,
}

impl FrankfurterRateProvider {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            timeout_secs,
        })
    }

    /// Fetch the raw rate map, with errors
    pub async fn get_latest(&self) -> Result<HashMap<String, f64>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Rate API error: HTTP {}", status.as_u16());
        }

        let body: LatestResponse = response
            .json()
            .await
            .context("Failed to parse rate response")?;

        body.rates.context("Rate response has no rates")
    }

    fn map_request_error(&self, error: reqwest::Error) -> anyhow::Error {
        if error.is_timeout() {
            anyhow::anyhow!("Rate request timed out after {} seconds", self.timeout_secs)
        } else if error.is_connect() {
            anyhow::anyhow!("Unable to connect to rate server")
        } else {
            anyhow::anyhow!("Rate request failed: {}", error)
        }
    }
}

#[async_trait]
impl RateProvider for FrankfurterRateProvider {
    fn name(&self) -> &str {
        "frankfurter"
    }

    async fn fetch_rates(&self) -> Option<HashMap<String, f64>> {
        match self.get_latest().await {
            Ok(rates) => Some(rates),
            Err(e) => {
                eprintln!("[schplitz] {}", e);
                None
            }
        }
    }
}
