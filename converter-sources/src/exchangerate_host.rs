//! exchangerate.host: keyed, `quotes` keyed by `{SOURCE}{TARGET}`.

use std::collections::HashMap;

use async_trait::async_trait;
use converter_types::{CurrencyCode, FetchError, RateMap, RateSource};
use serde::Deserialize;

use crate::http::{HttpSource, check_base, into_rate_map};

pub const EXCHANGERATE_HOST_URL: &str = "https://api.exchangerate.host";

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateHostResponse {
    success: bool,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    error: Option<ProviderError>,
    #[serde(default)]
    quotes: Option<HashMap<String, f64>>,
}

pub struct ExchangeRateHost {
    http: HttpSource,
    access_key: String,
}

impl ExchangeRateHost {
    pub fn new(http: HttpSource, access_key: impl Into<String>) -> Self {
        Self {
            http,
            access_key: access_key.into(),
        }
    }
}

fn normalize(base: CurrencyCode, resp: ExchangeRateHostResponse) -> Result<RateMap, FetchError> {
    if !resp.success {
        let detail = resp
            .error
            .map(|e| {
                format!(
                    "{} {}",
                    e.code.map(|c| c.to_string()).unwrap_or_default(),
                    e.info.unwrap_or_default()
                )
                .trim()
                .to_string()
            })
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "unknown error".into());
        return Err(FetchError::Parse(format!("provider reported error: {}", detail)));
    }
    check_base(resp.source.as_deref(), base)?;
    let quotes = resp
        .quotes
        .ok_or_else(|| FetchError::Parse("missing `quotes`".into()))?;

    // "USDEUR" -> "EUR"; keys without the source prefix are ignored.
    let entries = quotes.into_iter().filter_map(|(pair, rate)| {
        pair.strip_prefix(base.code())
            .map(|target| (target.to_string(), rate))
    });
    into_rate_map(base, entries)
}

#[async_trait]
impl RateSource for ExchangeRateHost {
    fn name(&self) -> &str {
        "exchangerate-host"
    }

    async fn fetch(&self, base: CurrencyCode) -> Result<RateMap, FetchError> {
        let resp = self
            .http
            .get_json::<ExchangeRateHostResponse>(
                "/live",
                &[("source", base.code()), ("access_key", self.access_key.as_str())],
            )
            .await?;
        normalize(base, resp)
    }
}
