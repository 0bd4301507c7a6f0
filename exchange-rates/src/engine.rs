//! Pure conversion and display formatting.
//!
//! Nothing here performs I/O or mutates its inputs, so the UI can call these
//! on every keystroke.

use crate::{CurrencyCode, RateMap, SymbolPosition};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Rate not available for {0}")]
    RateUnavailable(String),
    #[error("Converted amount is out of range")]
    OutOfRange,
}

/// Parses user input permissively: anything that is not a finite number is 0.
pub fn coerce_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

fn rate_of(code: CurrencyCode, rates: &RateMap) -> Result<f64, ConversionError> {
    rates
        .get(code)
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| ConversionError::RateUnavailable(code.code().to_string()))
}

/// Converts `amount` through the map's base currency.
pub fn convert(
    amount: f64,
    from: CurrencyCode,
    to: CurrencyCode,
    rates: &RateMap,
) -> Result<f64, ConversionError> {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let from_rate = rate_of(from, rates)?;
    let to_rate = rate_of(to, rates)?;

    if from == to {
        return Ok(amount);
    }

    let converted = amount / from_rate * to_rate;
    if converted.is_finite() {
        Ok(converted)
    } else {
        Err(ConversionError::OutOfRange)
    }
}

/// Units of `to` per 1 unit of `from`.
pub fn rate_between(
    from: CurrencyCode,
    to: CurrencyCode,
    rates: &RateMap,
) -> Result<f64, ConversionError> {
    convert(1.0, from, to, rates)
}

/// `"1 USD = 0.8500 EUR"`
pub fn rate_summary(
    from: CurrencyCode,
    to: CurrencyCode,
    rates: &RateMap,
) -> Result<String, ConversionError> {
    let rate = rate_between(from, to, rates)?;
    Ok(format!("1 {} = {} {}", from, render(rate, 4, None), to))
}

/// Formats `amount` for display in `currency`.
///
/// Never fails: an unknown code renders with 2 fraction digits and no symbol.
pub fn format_amount(amount: f64, currency: &str) -> String {
    match currency.parse::<CurrencyCode>() {
        Ok(code) => format_in(amount, code),
        Err(_) => render(amount, 2, None),
    }
}

pub fn format_in(amount: f64, currency: CurrencyCode) -> String {
    render(
        amount,
        currency.fraction_digits(),
        Some((currency.symbol(), currency.symbol_position())),
    )
}

fn render(amount: f64, digits: u8, symbol: Option<(&str, SymbolPosition)>) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.*}", digits as usize, amount.abs());
    // Rounds-to-zero values never render as "-0".
    let negative = amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

    let mut number = match fixed.split_once('.') {
        Some((int_part, frac_part)) => {
            let mut grouped = group_thousands(int_part);
            grouped.push('.');
            grouped.push_str(frac_part);
            grouped
        }
        None => group_thousands(&fixed),
    };

    if let Some((sym, position)) = symbol {
        number = match position {
            SymbolPosition::Prefix => format!("{sym}{number}"),
            SymbolPosition::Suffix => format!("{number} {sym}"),
        };
    }

    if negative {
        format!("-{number}")
    } else {
        number
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(entries: &[(&str, f64)]) -> RateMap {
        RateMap::normalize(CurrencyCode::USD, entries.iter().copied()).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9 * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_usd_to_eur() {
        let map = rates(&[("EUR", 0.85)]);
        let converted = convert(100.0, CurrencyCode::USD, CurrencyCode::EUR, &map).unwrap();
        assert_close(converted, 85.0);
        assert_eq!(format_amount(converted, "EUR"), "€85.00");
    }

    #[test]
    fn test_usd_to_jpy_groups_without_decimals() {
        let map = rates(&[("JPY", 110.5)]);
        let converted = convert(1000.0, CurrencyCode::USD, CurrencyCode::JPY, &map).unwrap();
        assert_close(converted, 110_500.0);
        assert_eq!(format_amount(converted, "JPY"), "¥110,500");
    }

    #[test]
    fn test_cross_rate_goes_through_base() {
        let map = rates(&[("EUR", 0.8), ("GBP", 0.6)]);
        let converted = convert(80.0, CurrencyCode::EUR, CurrencyCode::GBP, &map).unwrap();
        assert_close(converted, 60.0);
    }

    #[test]
    fn test_same_currency_is_identity() {
        let map = rates(&[("EUR", 0.85), ("KRW", 1337.77)]);
        for amount in [0.0, 1.0, 0.1, 123.456, -42.0, 1e12] {
            assert_eq!(
                convert(amount, CurrencyCode::KRW, CurrencyCode::KRW, &map).unwrap(),
                amount
            );
        }
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let map = rates(&[("EUR", 0.9137), ("INR", 83.127), ("HUF", 355.12)]);
        for (a, b) in [
            (CurrencyCode::EUR, CurrencyCode::INR),
            (CurrencyCode::HUF, CurrencyCode::USD),
            (CurrencyCode::INR, CurrencyCode::HUF),
        ] {
            let there = convert(250.75, a, b, &map).unwrap();
            let back = convert(there, b, a, &map).unwrap();
            assert_close(back, 250.75);
        }
    }

    #[test]
    fn test_zero_and_negative_amounts() {
        let map = rates(&[("EUR", 0.5)]);
        assert_eq!(
            convert(0.0, CurrencyCode::USD, CurrencyCode::EUR, &map).unwrap(),
            0.0
        );
        assert_close(
            convert(-10.0, CurrencyCode::USD, CurrencyCode::EUR, &map).unwrap(),
            -5.0,
        );
    }

    #[test]
    fn test_non_finite_amount_coerced_to_zero() {
        let map = rates(&[("EUR", 0.5)]);
        assert_eq!(
            convert(f64::NAN, CurrencyCode::USD, CurrencyCode::EUR, &map).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_missing_rate_is_reported() {
        let map = rates(&[("EUR", 0.85)]);
        let err = convert(1.0, CurrencyCode::USD, CurrencyCode::JPY, &map).unwrap_err();
        assert_eq!(err, ConversionError::RateUnavailable("JPY".into()));

        let err = convert(1.0, CurrencyCode::GBP, CurrencyCode::GBP, &map).unwrap_err();
        assert_eq!(err, ConversionError::RateUnavailable("GBP".into()));
    }

    #[test]
    fn test_overflowing_result_is_rejected() {
        let map = rates(&[("KRW", 1337.77)]);
        let err = convert(1e308, CurrencyCode::USD, CurrencyCode::KRW, &map).unwrap_err();
        assert_eq!(err, ConversionError::OutOfRange);

        let back = convert(1e308, CurrencyCode::KRW, CurrencyCode::USD, &map).unwrap();
        assert!(back.is_finite());
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount("42.5"), 42.5);
        assert_eq!(coerce_amount("  7 "), 7.0);
        assert_eq!(coerce_amount("-3"), -3.0);
        assert_eq!(coerce_amount("abc"), 0.0);
        assert_eq!(coerce_amount(""), 0.0);
        assert_eq!(coerce_amount("NaN"), 0.0);
        assert_eq!(coerce_amount("inf"), 0.0);
    }

    #[test]
    fn test_format_grouping_and_negatives() {
        assert_eq!(format_amount(1234567.891, "USD"), "$1,234,567.89");
        assert_eq!(format_amount(-5.0, "GBP"), "-£5.00");
        assert_eq!(format_amount(-0.001, "USD"), "$0.00");
        assert_eq!(format_amount(999.7, "KRW"), "₩1,000");
    }

    #[test]
    fn test_format_suffix_symbols() {
        assert_eq!(format_amount(1000.0, "HUF"), "1,000 Ft");
        assert_eq!(format_amount(12.5, "SEK"), "12.50 kr");
        assert_eq!(format_amount(-12.5, "CHF"), "-12.50 CHF");
    }

    #[test]
    fn test_format_unknown_currency_falls_back() {
        assert_eq!(format_amount(1234.5, "XYZ"), "1,234.50");
        assert_eq!(format_amount(f64::INFINITY, "EUR"), "€0.00");
    }

    #[test]
    fn test_rate_summary() {
        let map = rates(&[("EUR", 0.85), ("KRW", 1330.0)]);
        assert_eq!(
            rate_summary(CurrencyCode::USD, CurrencyCode::EUR, &map).unwrap(),
            "1 USD = 0.8500 EUR"
        );
        assert_eq!(
            rate_summary(CurrencyCode::USD, CurrencyCode::KRW, &map).unwrap(),
            "1 USD = 1,330.0000 KRW"
        );
        assert!(rate_summary(CurrencyCode::USD, CurrencyCode::JPY, &map).is_err());
    }
}
