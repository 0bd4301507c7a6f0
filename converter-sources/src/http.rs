//! Shared HTTP plumbing for the provider adapters.

use converter_types::{CurrencyCode, FetchError, RateMap};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

/// GET-only JSON client bound to one provider's base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    http: Client,
}

impl HttpSource {
    /// Creates a new source client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a source client sharing an existing connection pool.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one GET and decodes the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = resp.text().await.map_err(classify)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Rejects a response whose reported base differs from the requested one.
pub(crate) fn check_base(reported: Option<&str>, base: CurrencyCode) -> Result<(), FetchError> {
    match reported {
        Some(code) if !code.eq_ignore_ascii_case(base.code()) => Err(FetchError::Parse(format!(
            "expected rates relative to {}, got {}",
            base, code
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn into_rate_map<K, I>(base: CurrencyCode, entries: I) -> Result<RateMap, FetchError>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, f64)>,
{
    RateMap::normalize(base, entries).map_err(|e| FetchError::Parse(e.to_string()))
}
