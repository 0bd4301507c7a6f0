//! Cached rate snapshot.

use serde::{Deserialize, Serialize};

use crate::RateMap;

/// Where a cached [`RateMap`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum RateOrigin {
    /// Fetched from a live provider.
    Live { provider: String },
    /// The hardcoded offline table installed after every provider failed.
    Offline,
}

impl RateOrigin {
    pub fn live(provider: impl Into<String>) -> Self {
        RateOrigin::Live {
            provider: provider.into(),
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, RateOrigin::Offline)
    }
}

/// The last rate map written to the cache together with its fetch time.
///
/// Both fields are only ever replaced together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRates {
    pub rates: RateMap,
    /// Epoch milliseconds.
    pub fetched_at: i64,
    pub origin: RateOrigin,
}

impl CachedRates {
    pub fn new(rates: RateMap, fetched_at: i64, origin: RateOrigin) -> Self {
        Self {
            rates,
            fetched_at,
            origin,
        }
    }

    /// Stale once `now - fetched_at >= ttl_ms`.
    ///
    /// A timestamp in the future can only come from a clock jump or corrupted
    /// storage, and is treated as stale.
    pub fn is_stale(&self, now: i64, ttl_ms: i64) -> bool {
        let age = now.saturating_sub(self.fetched_at);
        age < 0 || age >= ttl_ms
    }
}
