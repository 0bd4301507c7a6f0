//! Source selection and credentials.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use converter_types::RateSource;
use reqwest::Client;

use crate::exchangerate_api::EXCHANGERATE_API_URL;
use crate::exchangerate_host::EXCHANGERATE_HOST_URL;
use crate::frankfurter::FRANKFURTER_URL;
use crate::open_er::OPEN_ER_API_URL;
use crate::{ExchangeRateApi, ExchangeRateHost, Frankfurter, HttpSource, OpenErApi};

/// The providers this crate has adapters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    OpenErApi,
    ExchangeRateApi,
    ExchangeRateHost,
    Frankfurter,
}

impl SourceKind {
    /// Default priority order, best provider first.
    pub const DEFAULT_ORDER: [SourceKind; 4] = [
        SourceKind::OpenErApi,
        SourceKind::ExchangeRateApi,
        SourceKind::ExchangeRateHost,
        SourceKind::Frankfurter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::OpenErApi => "open-er-api",
            SourceKind::ExchangeRateApi => "exchangerate-api",
            SourceKind::ExchangeRateHost => "exchangerate-host",
            SourceKind::Frankfurter => "frankfurter",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            SourceKind::OpenErApi => OPEN_ER_API_URL,
            SourceKind::ExchangeRateApi => EXCHANGERATE_API_URL,
            SourceKind::ExchangeRateHost => EXCHANGERATE_HOST_URL,
            SourceKind::Frankfurter => FRANKFURTER_URL,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::DEFAULT_ORDER
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown rate source: {}", s))
    }
}

/// Which sources to use, in which order, with which credentials.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub order: Vec<SourceKind>,
    pub exchangerate_api_key: Option<String>,
    pub exchangerate_host_key: Option<String>,
    pub base_urls: HashMap<SourceKind, String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            order: SourceKind::DEFAULT_ORDER.to_vec(),
            exchangerate_api_key: None,
            exchangerate_host_key: None,
            base_urls: HashMap::new(),
        }
    }
}

impl SourcesConfig {
    /// Loads `.env` if present, then reads configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// - `CONVERTER_RATE_SOURCES`: comma-separated source names, in priority order
    /// - `EXCHANGERATE_API_KEY`, `EXCHANGERATE_HOST_KEY`: provider credentials
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(list) = non_empty("CONVERTER_RATE_SOURCES") {
            let mut order = Vec::new();
            for name in list.split(',').filter(|n| !n.trim().is_empty()) {
                match name.parse::<SourceKind>() {
                    Ok(kind) if !order.contains(&kind) => order.push(kind),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Ignoring rate source: {}", e),
                }
            }
            config.order = order;
        }

        config.exchangerate_api_key = non_empty("EXCHANGERATE_API_KEY");
        config.exchangerate_host_key = non_empty("EXCHANGERATE_HOST_KEY");
        config
    }

    /// Points a source at a different base URL (mirrors, local stubs).
    pub fn with_base_url(mut self, kind: SourceKind, url: impl Into<String>) -> Self {
        self.base_urls.insert(kind, url.into());
        self
    }

    fn url_for(&self, kind: SourceKind) -> &str {
        self.base_urls
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_url())
    }
}

/// Instantiates the configured sources in priority order.
///
/// Sources that need a key are skipped when none is configured.
pub fn build_sources(config: &SourcesConfig) -> Vec<Arc<dyn RateSource>> {
    let client = Client::new();
    let mut sources: Vec<Arc<dyn RateSource>> = Vec::new();

    for kind in &config.order {
        let http = HttpSource::with_client(client.clone(), config.url_for(*kind));
        match kind {
            SourceKind::OpenErApi => sources.push(Arc::new(OpenErApi::new(http))),
            SourceKind::Frankfurter => sources.push(Arc::new(Frankfurter::new(http))),
            SourceKind::ExchangeRateApi => match &config.exchangerate_api_key {
                Some(key) => sources.push(Arc::new(ExchangeRateApi::new(http, key))),
                None => tracing::debug!("Skipping {}: no API key configured", kind),
            },
            SourceKind::ExchangeRateHost => match &config.exchangerate_host_key {
                Some(key) => sources.push(Arc::new(ExchangeRateHost::new(http, key))),
                None => tracing::debug!("Skipping {}: no access key configured", kind),
            },
        }
    }

    sources
}
