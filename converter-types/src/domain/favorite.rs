//! Favorite currency pair, identified by its canonical `"{from}-{to}"` id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CurrencyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FavoritePair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl FavoritePair {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    /// Canonical id, e.g. `"USD-EUR"`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }

    pub fn swapped(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for FavoritePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for FavoritePair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid currency pair id: {}", s))?;
        let from = from.parse::<CurrencyCode>().map_err(|e| e.to_string())?;
        let to = to.parse::<CurrencyCode>().map_err(|e| e.to_string())?;
        Ok(Self { from, to })
    }
}

impl TryFrom<String> for FavoritePair {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FavoritePair> for String {
    fn from(pair: FavoritePair) -> Self {
        pair.id()
    }
}
