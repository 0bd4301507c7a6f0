//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use converter_types::{ConversionRequest, CurrencyCode};
use exchange_rates::BASE_CURRENCY;

/// Tunables for one converter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    /// Currency every fetched rate map is expressed against.
    pub base_currency: CurrencyCode,
    /// Age at which cached rates become stale.
    pub cache_ttl: Duration,
    /// Deadline for a single rate source attempt.
    pub attempt_timeout: Duration,
    /// Period of the scheduled refresh task.
    pub refresh_interval: Duration,
    pub favorites_capacity: usize,
    /// Prefix of the storage keys.
    pub storage_namespace: String,
    /// Selection shown before the user converts anything.
    pub default_request: ConversionRequest,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        let ttl = Duration::from_secs(60 * 60);
        Self {
            base_currency: BASE_CURRENCY,
            cache_ttl: ttl,
            attempt_timeout: Duration::from_secs(10),
            refresh_interval: ttl,
            favorites_capacity: 5,
            storage_namespace: "currency-converter".to_string(),
            default_request: ConversionRequest::new(1.0, CurrencyCode::USD, CurrencyCode::EUR),
        }
    }
}

impl ConverterConfig {
    /// Loads `.env` if present, then reads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup; unset
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = parse::<u64>(&lookup, "CONVERTER_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
            config.refresh_interval = config.cache_ttl;
        }
        if let Some(secs) = parse::<u64>(&lookup, "CONVERTER_REFRESH_INTERVAL_SECS")? {
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64>(&lookup, "CONVERTER_ATTEMPT_TIMEOUT_SECS")? {
            config.attempt_timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse::<usize>(&lookup, "CONVERTER_FAVORITES_CAPACITY")? {
            config.favorites_capacity = capacity;
        }
        if let Some(namespace) = lookup("CONVERTER_STORAGE_NAMESPACE") {
            config.storage_namespace = namespace.trim().to_string();
        }
        if let Some(from) = parse::<CurrencyCode>(&lookup, "CONVERTER_DEFAULT_FROM")? {
            config.default_request.from = from;
        }
        if let Some(to) = parse::<CurrencyCode>(&lookup, "CONVERTER_DEFAULT_TO")? {
            config.default_request.to = to;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.cache_ttl.is_zero() {
            anyhow::bail!("cache TTL must be positive");
        }
        if self.refresh_interval.is_zero() {
            anyhow::bail!("refresh interval must be positive");
        }
        if self.attempt_timeout.is_zero() {
            anyhow::bail!("attempt timeout must be positive");
        }
        if self.favorites_capacity == 0 {
            anyhow::bail!("favorites capacity must be at least 1");
        }
        if self.storage_namespace.is_empty() {
            anyhow::bail!("storage namespace must not be empty");
        }
        Ok(())
    }

    pub fn rates_key(&self) -> String {
        format!("{}.rates", self.storage_namespace)
    }

    pub fn favorites_key(&self) -> String {
        format!("{}.favorites", self.storage_namespace)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {}={:?}: {}", key, raw, e)),
        _ => Ok(None),
    }
}
