//! Ordered fallback over the configured rate sources.
//!
//! Sources are tried strictly one after another in priority order, each under
//! its own deadline. The first valid map wins and later sources are never
//! called. Individual failures are logged here and only surface as part of
//! [`AllProvidersFailed`].

use std::sync::Arc;
use std::time::Duration;

use converter_types::{
    AllProvidersFailed, CurrencyCode, FetchError, ProviderFailure, RateMap, RateSource,
};
use tracing::{info, instrument, warn};

/// A successful fetch and the source that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRates {
    pub rates: RateMap,
    pub provider: String,
}

pub struct FallbackFetcher {
    sources: Vec<Arc<dyn RateSource>>,
    attempt_timeout: Duration,
}

impl FallbackFetcher {
    pub fn new(sources: Vec<Arc<dyn RateSource>>, attempt_timeout: Duration) -> Self {
        Self {
            sources,
            attempt_timeout,
        }
    }

    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn fetch(&self, base: CurrencyCode) -> Result<FetchedRates, AllProvidersFailed> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match self.attempt(source.as_ref(), base).await {
                Ok(rates) => {
                    info!(
                        provider = source.name(),
                        currencies = rates.len(),
                        "Fetched exchange rates"
                    );
                    return Ok(FetchedRates {
                        rates,
                        provider: source.name().to_string(),
                    });
                }
                Err(error) => {
                    warn!(provider = source.name(), error = %error, "Rate source failed");
                    failures.push(ProviderFailure {
                        provider: source.name().to_string(),
                        error,
                    });
                }
            }
        }

        Err(AllProvidersFailed { failures })
    }

    async fn attempt(
        &self,
        source: &dyn RateSource,
        base: CurrencyCode,
    ) -> Result<RateMap, FetchError> {
        // Dropping the pending future on timeout cancels the request.
        let rates = tokio::time::timeout(self.attempt_timeout, source.fetch(base))
            .await
            .map_err(|_| FetchError::Timeout)??;

        if rates.base() != base {
            return Err(FetchError::Parse(format!(
                "expected rates relative to {}, got {}",
                base,
                rates.base()
            )));
        }
        Ok(rates)
    }
}
