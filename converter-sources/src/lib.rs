//! # Converter Sources
//!
//! Rate source adapters (one per external provider) implementing the
//! `RateSource` port. Each adapter owns its request construction and the
//! normalization of its provider's response shape into a `RateMap`:
//!
//! | adapter              | response key        |
//! |----------------------|---------------------|
//! | [`OpenErApi`]        | `rates`             |
//! | [`ExchangeRateApi`]  | `conversion_rates`  |
//! | [`ExchangeRateHost`] | `quotes` (`USDEUR`) |
//! | [`Frankfurter`]      | `rates` (no base)   |

mod config;
mod exchangerate_api;
mod exchangerate_host;
mod frankfurter;
mod http;
mod open_er;

pub use config::{SourceKind, SourcesConfig, build_sources};
pub use exchangerate_api::ExchangeRateApi;
pub use exchangerate_host::ExchangeRateHost;
pub use frankfurter::Frankfurter;
pub use http::HttpSource;
pub use open_er::OpenErApi;
