//! UI layer port.
//!
//! The controller pushes display-ready output through this trait; rendering
//! itself happens outside this workspace.

use crate::{ConversionView, FavoritePair};

pub trait UiSink: Send + Sync {
    /// A conversion result is ready to display.
    fn render(&self, view: &ConversionView);

    /// Rates are not available yet; show the loading state.
    fn show_loading(&self);

    /// Show a user-visible warning (degraded mode).
    fn warn(&self, message: &str);

    /// The favorites list changed.
    fn favorites_changed(&self, favorites: &[FavoritePair]);
}
