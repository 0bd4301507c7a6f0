//! # Converter Types
//!
//! Domain types and port traits for the currency converter.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture
//! (currency math itself lives one ring further in, in `exchange-rates`):
//! - `domain/` - Cached rates, favorite pairs, conversion requests and views
//! - `ports/` - Trait definitions that adapters must implement
//! - `error/` - Fetch, aggregate and storage error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CachedRates, ConversionRequest, ConversionView, ConverterState, FavoritePair, RateOrigin,
    UiEvent,
};
pub use error::{AllProvidersFailed, FetchError, ProviderFailure, StoreError};
pub use exchange_rates::{ConversionError, CurrencyCode, RateMap};
pub use ports::{Clock, KeyValueStore, RateSource, SystemClock, UiSink};
