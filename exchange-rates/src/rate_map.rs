//! Canonical rate table every provider response is collapsed into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CurrencyCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateMapError {
    #[error("No usable rates relative to {0}")]
    Empty(CurrencyCode),
}

/// Rates of supported currencies, all expressed per 1 unit of `base`.
///
/// Invariants: `rates[base] == 1`, every entry is strictly positive and finite.
/// A map is only ever built through [`RateMap::normalize`] (or the offline
/// table), so both hold for every value of this type, including deserialized
/// ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateMap", into = "RawRateMap")]
pub struct RateMap {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

#[derive(Serialize, Deserialize)]
struct RawRateMap {
    base: CurrencyCode,
    rates: BTreeMap<String, f64>,
}

impl RateMap {
    /// Builds a map from raw `(code, rate)` entries.
    ///
    /// Codes outside the supported set and non-positive or non-finite values
    /// are dropped. The base entry is always forced to exactly 1.
    pub fn normalize<K, I>(base: CurrencyCode, entries: I) -> Result<Self, RateMapError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut rates: BTreeMap<CurrencyCode, f64> = entries
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .filter_map(|(code, rate)| {
                code.as_ref()
                    .parse::<CurrencyCode>()
                    .ok()
                    .map(|code| (code, rate))
            })
            .collect();

        rates.insert(base, 1.0);
        if rates.len() < 2 {
            return Err(RateMapError::Empty(base));
        }

        Ok(Self { base, rates })
    }

    /// The hardcoded last-resort table, rebased onto `base`.
    pub fn offline(base: CurrencyCode) -> Self {
        let base_rate = base.offline_rate();
        let mut rates: BTreeMap<CurrencyCode, f64> = CurrencyCode::all()
            .iter()
            .map(|code| (*code, code.offline_rate() / base_rate))
            .collect();
        rates.insert(base, 1.0);
        Self { base, rates }
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn get(&self, code: CurrencyCode) -> Option<f64> {
        self.rates.get(&code).copied()
    }

    pub fn contains(&self, code: CurrencyCode) -> bool {
        self.rates.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, f64)> + '_ {
        self.rates.iter().map(|(code, rate)| (*code, *rate))
    }
}

impl TryFrom<RawRateMap> for RateMap {
    type Error = RateMapError;

    fn try_from(raw: RawRateMap) -> Result<Self, Self::Error> {
        RateMap::normalize(raw.base, raw.rates)
    }
}

impl From<RateMap> for RawRateMap {
    fn from(map: RateMap) -> Self {
        Self {
            base: map.base,
            rates: map
                .rates
                .into_iter()
                .map(|(code, rate)| (code.code().to_string(), rate))
                .collect(),
        }
    }
}
