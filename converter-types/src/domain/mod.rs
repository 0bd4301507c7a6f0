//! Domain models for the currency converter.

pub mod conversion;
pub mod favorite;
pub mod rates;

pub use conversion::{ConversionRequest, ConversionView, ConverterState, UiEvent};
pub use favorite::FavoritePair;
pub use rates::{CachedRates, RateOrigin};
