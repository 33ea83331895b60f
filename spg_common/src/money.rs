use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

/// The currency code used by this deployment. Prices are single-currency.
pub const DEFAULT_CURRENCY_CODE: &str = "brl";

//--------------------------------------        Money        ---------------------------------------------------------
/// A currency amount, stored as an integer number of cents.
///
/// Amounts are rendered with two-place decimal precision everywhere they cross a wire or a screen. Keeping the
/// backing value integral means there is no floating point arithmetic anywhere in the payment path.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a currency amount: {0}")]
pub struct MoneyConversionError(pub String);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The line total for `quantity` units at this unit price.
    pub fn times(&self, quantity: u32) -> Result<Money, MoneyConversionError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or_else(|| MoneyConversionError(format!("{} x {quantity} overflows", self.0)))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a two-place decimal amount, e.g. "25.99", "7", or "7.5".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(MoneyConversionError(format!("'{s}' is not a decimal amount")));
        }
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!("'{s}' has sub-cent precision")));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|e| MoneyConversionError(format!("'{s}': {e}")))?
        };
        let cents: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<2}");
            padded.parse().map_err(|e| MoneyConversionError(format!("'{s}': {e}")))?
        };
        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .and_then(|v| v.checked_mul(sign))
            .map(Money)
            .ok_or_else(|| MoneyConversionError(format!("'{s}' is out of range")))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    /// Accepts `"25.99"`, `25.99` and `25`. JSON number input is rounded to the nearest cent, since clients that
    /// send floats already gave up sub-cent accuracy.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => {
                let cents = (n * 100.0).round();
                if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
                    return Err(de::Error::custom(format!("{n} is out of range for a currency amount")));
                }
                Ok(Money(cents as i64))
            },
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_two_decimal_places() {
        assert_eq!(Money::from_cents(2599).to_string(), "25.99");
        assert_eq!(Money::from_cents(700).to_string(), "7.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!("25.99".parse::<Money>().unwrap(), Money::from_cents(2599));
        assert_eq!("7".parse::<Money>().unwrap(), Money::from_cents(700));
        assert_eq!("7.5".parse::<Money>().unwrap(), Money::from_cents(750));
        assert_eq!("-1.50".parse::<Money>().unwrap(), Money::from_cents(-150));
        assert!("1.999".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn line_totals() {
        let unit = Money::from_cents(2599);
        assert_eq!(unit.times(1).unwrap(), Money::from_cents(2599));
        assert_eq!(unit.times(3).unwrap(), Money::from_cents(7797));
        assert!(Money::from_cents(i64::MAX).times(2).is_err());
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let m: Money = serde_json::from_str("25.99").unwrap();
        assert_eq!(m, Money::from_cents(2599));
        let m: Money = serde_json::from_str("\"25.99\"").unwrap();
        assert_eq!(m, Money::from_cents(2599));
        let m: Money = serde_json::from_str("25").unwrap();
        assert_eq!(m, Money::from_cents(2500));
    }
}
