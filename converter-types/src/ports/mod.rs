//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The controller depends on these traits, not concrete implementations.

mod clock;
mod source;
mod store;
mod ui;

pub use clock::{Clock, SystemClock};
pub use source::RateSource;
pub use store::KeyValueStore;
pub use ui::UiSink;
