//! Conversion requests, render output and controller state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ConversionError, CurrencyCode, FavoritePair};

/// A single conversion asked for by the UI. Not stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { amount, from, to }
    }

    /// Builds a request from raw form values.
    ///
    /// The amount is coerced (bad input becomes 0). A code outside the
    /// supported set has no rate by definition and is reported as
    /// [`ConversionError::RateUnavailable`].
    pub fn from_input(amount: &str, from: &str, to: &str) -> Result<Self, ConversionError> {
        let parse = |code: &str| {
            code.parse::<CurrencyCode>()
                .map_err(|_| ConversionError::RateUnavailable(code.trim().to_uppercase()))
        };
        Ok(Self {
            amount: exchange_rates::coerce_amount(amount),
            from: parse(from)?,
            to: parse(to)?,
        })
    }

    pub fn pair(&self) -> FavoritePair {
        FavoritePair::new(self.from, self.to)
    }

    pub fn swapped(&self) -> Self {
        Self {
            amount: self.amount,
            from: self.to,
            to: self.from,
        }
    }
}

/// Display-ready result handed to the UI after every render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionView {
    pub converted_amount_text: String,
    pub rate_summary_text: String,
    pub is_degraded: bool,
}

/// User actions routed from the UI to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Convert(ConversionRequest),
    Swap,
    Refresh,
    ToggleFavorite(FavoritePair),
}

/// Lifecycle of one converter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterState {
    Idle,
    Refreshing,
    Ready,
    Degraded,
}

impl fmt::Display for ConverterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConverterState::Idle => "idle",
            ConverterState::Refreshing => "refreshing",
            ConverterState::Ready => "ready",
            ConverterState::Degraded => "degraded",
        };
        f.write_str(name)
    }
}
