use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Digits allowed in total.
pub const MAX_DIGITS: usize = 5;
/// Digits allowed after the decimal point.
pub const DECIMAL_PLACES: usize = 2;

/// Fixed-point price held in hundredths.
///
/// Serialized as a string with exactly two decimal places, e.g. `"5.00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price {
    cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("A valid number is required.")]
    Invalid,
    #[error("Ensure that there are no more than {} digits in total.", MAX_DIGITS)]
    TooManyDigits,
    #[error("Ensure that there are no more than {} decimal places.", DECIMAL_PLACES)]
    TooManyDecimalPlaces,
    #[error(
        "Ensure that there are no more than {} digits before the decimal point.",
        MAX_DIGITS - DECIMAL_PLACES
    )]
    TooManyWholeDigits,
}

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn cents(self) -> i64 {
        self.cents
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(PriceError::Invalid);
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() + fraction.len() > MAX_DIGITS {
            return Err(PriceError::TooManyDigits);
        }
        if fraction.len() > DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces);
        }
        if whole.len() > MAX_DIGITS - DECIMAL_PLACES {
            return Err(PriceError::TooManyWholeDigits);
        }

        // Bounded by MAX_DIGITS above, so these cannot overflow.
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| PriceError::Invalid)?
        };
        let fraction_value: i64 = format!("{:0<width$}", fraction, width = DECIMAL_PLACES)
            .parse()
            .map_err(|_| PriceError::Invalid)?;

        let cents = whole_value * 100 + fraction_value;
        Ok(Self::from_cents(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
