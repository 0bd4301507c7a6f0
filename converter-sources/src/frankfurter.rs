//! Frankfurter (ECB reference rates): keyless, `rates` without the base entry.

use std::collections::HashMap;

use async_trait::async_trait;
use converter_types::{CurrencyCode, FetchError, RateMap, RateSource};
use serde::Deserialize;

use crate::http::{HttpSource, check_base, into_rate_map};

pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    #[serde(default)]
    base: Option<String>,
    rates: HashMap<String, f64>,
}

pub struct Frankfurter {
    http: HttpSource,
}

impl Frankfurter {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }
}

impl Default for Frankfurter {
    fn default() -> Self {
        Self::new(HttpSource::new(FRANKFURTER_URL))
    }
}

fn normalize(base: CurrencyCode, resp: FrankfurterResponse) -> Result<RateMap, FetchError> {
    check_base(resp.base.as_deref(), base)?;
    // The base entry is injected by `RateMap::normalize`.
    into_rate_map(base, resp.rates)
}

#[async_trait]
impl RateSource for Frankfurter {
    fn name(&self) -> &str {
        "frankfurter"
    }

    async fn fetch(&self, base: CurrencyCode) -> Result<RateMap, FetchError> {
        let resp = self
            .http
            .get_json::<FrankfurterResponse>("/latest", &[("from", base.code())])
            .await?;
        normalize(base, resp)
    }
}
