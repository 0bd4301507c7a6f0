//! open.er-api.com: keyless, `rates` keyed by currency code.

use std::collections::HashMap;

use async_trait::async_trait;
use converter_types::{CurrencyCode, FetchError, RateMap, RateSource};
use serde::Deserialize;

use crate::http::{HttpSource, check_base, into_rate_map};

pub const OPEN_ER_API_URL: &str = "https://open.er-api.com";

#[derive(Debug, Deserialize)]
struct OpenErResponse {
    result: String,
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

pub struct OpenErApi {
    http: HttpSource,
}

impl OpenErApi {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }
}

impl Default for OpenErApi {
    fn default() -> Self {
        Self::new(HttpSource::new(OPEN_ER_API_URL))
    }
}

fn normalize(base: CurrencyCode, resp: OpenErResponse) -> Result<RateMap, FetchError> {
    if resp.result != "success" {
        return Err(FetchError::Parse(format!(
            "provider reported {}: {}",
            resp.result,
            resp.error_type.as_deref().unwrap_or("unknown error")
        )));
    }
    check_base(resp.base_code.as_deref(), base)?;
    let rates = resp
        .rates
        .ok_or_else(|| FetchError::Parse("missing `rates`".into()))?;
    into_rate_map(base, rates)
}

#[async_trait]
impl RateSource for OpenErApi {
    fn name(&self) -> &str {
        "open-er-api"
    }

    async fn fetch(&self, base: CurrencyCode) -> Result<RateMap, FetchError> {
        let resp = self
            .http
            .get_json::<OpenErResponse>(&format!("/v6/latest/{}", base), &[])
            .await?;
        normalize(base, resp)
    }
}
