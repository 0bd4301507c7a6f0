//! Exchange Rates Library with Macro-Based Currency Registry
//!
//! This library owns everything about currencies that does not need I/O:
//! the supported currency set and its display metadata, the canonical
//! [`RateMap`] every provider response is normalized into, the hardcoded
//! offline rate table, and the pure conversion/formatting engine.
//!
//! Currencies are defined declaratively using a macro that generates the
//! [`CurrencyCode`] enum, its metadata lookups and the offline table.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` macro invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     PLN => ("PLN", "Polish Zloty", "zł", Suffix, 2, 4.02),
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{CurrencyCode, RateMap, convert, format_amount};
//!
//! let rates = RateMap::normalize(CurrencyCode::USD, [("EUR", 0.85)]).unwrap();
//! let euros = convert(100.0, CurrencyCode::USD, CurrencyCode::EUR, &rates).unwrap();
//! assert_eq!(format_amount(euros, "EUR"), "€85.00");
//! ```

use std::fmt;

mod engine;
mod rate_map;

pub use engine::{
    ConversionError, coerce_amount, convert, format_amount, format_in, rate_between, rate_summary,
};
pub use rate_map::{RateMap, RateMapError};

/// Currency every [`RateMap`] produced by this workspace is expressed against.
pub const BASE_CURRENCY: CurrencyCode = CurrencyCode::USD;

// ─────────────────────────────────────────────────────────────────────────────
// Currency Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolPosition {
    /// `€85.00`
    Prefix,
    /// `1,000 Ft`
    Suffix,
}

/// Static display metadata for a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyMeta {
    pub code: CurrencyCode,
    pub display_name: &'static str,
    pub symbol: &'static str,
    pub symbol_position: SymbolPosition,
    pub fraction_digits: u8,
}

/// Returned when a string does not name a supported currency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrency(pub String);

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines all currencies, CurrencyCode enum, and metadata dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define the supported currency set.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     Name => ("CODE", "Display name", "SYMBOL", Prefix|Suffix, fraction_digits, offline_rate_per_usd),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $display:literal, $symbol:literal, $position:ident, $digits:expr, $offline:expr)
        ),* $(,)?
    ) => {
        /// Uppercase ISO 4217 code of a supported currency.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn symbol_position(&self) -> $crate::SymbolPosition {
                match self {
                    $(CurrencyCode::$name => $crate::SymbolPosition::$position),*
                }
            }

            pub fn fraction_digits(&self) -> u8 {
                match self {
                    $(CurrencyCode::$name => $digits),*
                }
            }

            /// Last-resort rate per 1 USD, used only when every live provider fails.
            pub fn offline_rate(&self) -> f64 {
                match self {
                    $(CurrencyCode::$name => $offline),*
                }
            }

            pub fn meta(&self) -> $crate::CurrencyMeta {
                $crate::CurrencyMeta {
                    code: *self,
                    display_name: self.display_name(),
                    symbol: self.symbol(),
                    symbol_position: self.symbol_position(),
                    fraction_digits: self.fraction_digits(),
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = $crate::UnknownCurrency;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err($crate::UnknownCurrency(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

// Offline rates are a fixed snapshot and go stale by construction.
define_currencies! {
    USD => ("USD", "US Dollar", "$", Prefix, 2, 1.0),
    EUR => ("EUR", "Euro", "€", Prefix, 2, 0.92),
    GBP => ("GBP", "British Pound", "£", Prefix, 2, 0.79),
    JPY => ("JPY", "Japanese Yen", "¥", Prefix, 0, 149.5),
    CHF => ("CHF", "Swiss Franc", "CHF", Suffix, 2, 0.88),
    CAD => ("CAD", "Canadian Dollar", "C$", Prefix, 2, 1.36),
    AUD => ("AUD", "Australian Dollar", "A$", Prefix, 2, 1.52),
    NZD => ("NZD", "New Zealand Dollar", "NZ$", Prefix, 2, 1.64),
    CNY => ("CNY", "Chinese Yuan", "CN¥", Prefix, 2, 7.24),
    HKD => ("HKD", "Hong Kong Dollar", "HK$", Prefix, 2, 7.82),
    SGD => ("SGD", "Singapore Dollar", "S$", Prefix, 2, 1.34),
    INR => ("INR", "Indian Rupee", "₹", Prefix, 2, 83.1),
    KRW => ("KRW", "South Korean Won", "₩", Prefix, 0, 1330.0),
    HUF => ("HUF", "Hungarian Forint", "Ft", Suffix, 0, 355.0),
    SEK => ("SEK", "Swedish Krona", "kr", Suffix, 2, 10.4),
    NOK => ("NOK", "Norwegian Krone", "kr", Suffix, 2, 10.6),
    MXN => ("MXN", "Mexican Peso", "MX$", Prefix, 2, 17.1),
    BRL => ("BRL", "Brazilian Real", "R$", Prefix, 2, 4.97),
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
