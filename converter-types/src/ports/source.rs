//! Exchange rate source port.
//!
//! One implementation per external provider. Implementations own their
//! request shape and collapse the provider's response into a [`RateMap`].

use crate::{CurrencyCode, FetchError, RateMap};

/// Port trait for rate sources.
///
/// Calls are independent and must not mutate shared state. Dropping the
/// returned future cancels the request; the caller reports that as
/// [`FetchError::Timeout`].
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Stable name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Fetches rates for every currency the provider knows, relative to `base`.
    async fn fetch(&self, base: CurrencyCode) -> Result<RateMap, FetchError>;
}
