//! exchangerate-api.com v6: keyed, `conversion_rates`.

use std::collections::HashMap;

use async_trait::async_trait;
use converter_types::{CurrencyCode, FetchError, RateMap, RateSource};
use serde::Deserialize;

use crate::http::{HttpSource, check_base, into_rate_map};

pub const EXCHANGERATE_API_URL: &str = "https://v6.exchangerate-api.com";

#[derive(Debug, Deserialize)]
struct ExchangeRateApiResponse {
    result: String,
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, f64>>,
}

pub struct ExchangeRateApi {
    http: HttpSource,
    api_key: String,
}

impl ExchangeRateApi {
    pub fn new(http: HttpSource, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }
}

fn normalize(base: CurrencyCode, resp: ExchangeRateApiResponse) -> Result<RateMap, FetchError> {
    if resp.result != "success" {
        return Err(FetchError::Parse(format!(
            "provider reported {}: {}",
            resp.result,
            resp.error_type.as_deref().unwrap_or("unknown error")
        )));
    }
    check_base(resp.base_code.as_deref(), base)?;
    let rates = resp
        .conversion_rates
        .ok_or_else(|| FetchError::Parse("missing `conversion_rates`".into()))?;
    into_rate_map(base, rates)
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    async fn fetch(&self, base: CurrencyCode) -> Result<RateMap, FetchError> {
        let path = format!("/v6/{}/latest/{}", self.api_key, base);
        let resp = self
            .http
            .get_json::<ExchangeRateApiResponse>(&path, &[])
            .await?;
        normalize(base, resp)
    }
}
