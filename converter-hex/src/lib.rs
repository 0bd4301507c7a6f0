//! # Converter Hex
//!
//! Application layer of the currency converter.
//!
//! ## Architecture
//!
//! - `fetcher` - ordered fallback over the configured rate sources
//! - `cache` - last good rate map with TTL-based staleness and persistence
//! - `favorites` - bounded most-recently-used list of currency pairs
//! - `controller` - per-widget state machine wiring the above to the UI port
//! - `config` - tunables loaded from the environment
//!
//! The controller is generic over `S: KeyValueStore`, and sources, UI and
//! clock are injected, so tests run against in-memory fakes.

pub mod cache;
pub mod config;
pub mod controller;
pub mod favorites;
pub mod fetcher;


pub use cache::RateCache;
pub use config::ConverterConfig;
pub use controller::{
    Conversion, ConverterController, PendingRefresh, RefreshOutcome, RefreshTrigger,
};
pub use favorites::FavoritesStore;
pub use fetcher::{FallbackFetcher, FetchedRates};
