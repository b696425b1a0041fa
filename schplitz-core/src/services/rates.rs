//! Rate service - best-effort live exchange rates

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::RateTable;
use crate::ports::RateProvider;

/// Loads a rate table from a provider, falling back to static rates
#[derive(Clone)]
pub struct RateService {
    provider: Arc<dyn RateProvider>,
    offline: bool,
}

impl RateService {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self {
            provider,
            offline: false,
        }
    }

    /// Skip the provider entirely and always use static rates
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Current rates. Never fails; any problem yields the fallback table.
    pub async fn load(&self) -> RateTable {
        if self.offline {
            return RateTable::fallback();
        }
        match self.provider.fetch_rates().await {
            Some(raw) => RateTable::from_live(&raw),
            None => {
                eprintln!(
                    "[schplitz] Live rates from {} unavailable, using fallback rates",
                    self.provider.name()
                );
                RateTable::fallback()
            }
        }
    }

    /// Start loading in the background; await the handle only when needed
    pub fn spawn_load(&self) -> JoinHandle<RateTable> {
        let service = self.clone();
        tokio::spawn(async move { service.load().await })
    }
}
