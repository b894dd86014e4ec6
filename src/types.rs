//! Value types shared by the models, the stores and the wire format.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::postgres::types::PgInterval;
use thiserror::Error;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// Largest allowed price: 10 digits in total, two of them fractional.
const PRICE_MAX_WHOLE_DIGITS: u32 = 8;
const PRICE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("A valid number is required.")]
    Invalid,
    #[error("Ensure this value is greater than or equal to 0.00.")]
    Negative,
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimalPlaces,
    #[error("Ensure that there are no more than 8 digits before the decimal point.")]
    TooManyWholeDigits,
}

/// Non-negative monetary amount with two fractional digits.
///
/// Serialized as a decimal string (`"20.55"`) so clients never see float
/// rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        // Trailing zeros count, as in "1.000"
        if amount.scale() > PRICE_DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces);
        }
        let limit = Decimal::from(10_i64.pow(PRICE_MAX_WHOLE_DIGITS));
        if amount.trunc() >= limit {
            return Err(PriceError::TooManyWholeDigits);
        }

        let mut amount = amount.abs();
        amount.rescale(PRICE_DECIMAL_PLACES);
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0;
        amount.rescale(PRICE_DECIMAL_PLACES);
        write!(f, "{}", amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duration has wrong format. Use one of these formats instead: [DD] [HH:[MM:]]ss[.uuuuuu].")]
pub struct DurationFormatError;

/// Preparation time of a dish, kept at microsecond precision.
///
/// Text form is `[D ]HH:MM:SS[.ffffff]`; shorter `MM:SS` and `SS` inputs are
/// accepted and normalised on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PrepTime {
    micros: i64,
}

impl PrepTime {
    pub fn from_micros(micros: i64) -> Self {
        Self { micros: micros.max(0) }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self::from_micros(secs.saturating_mul(MICROS_PER_SECOND))
    }

    pub fn as_micros(&self) -> i64 {
        self.micros
    }
}

fn parse_digits(part: &str) -> Result<i64, DurationFormatError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationFormatError);
    }
    part.parse().map_err(|_| DurationFormatError)
}

impl FromStr for PrepTime {
    type Err = DurationFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Optional leading day count: "2 01:00:00" or "2 days, 01:00:00"
        let (days, clock) = match s.split_once(' ') {
            Some((days, rest)) => {
                let rest = rest
                    .strip_prefix("days, ")
                    .or_else(|| rest.strip_prefix("day, "))
                    .unwrap_or(rest);
                (parse_digits(days)?, rest.trim_start())
            }
            None => (0, s),
        };

        let (clock, fraction) = match clock.split_once(|c: char| c == '.' || c == ',') {
            Some((clock, fraction)) => (clock, Some(fraction)),
            None => (clock, None),
        };

        let parts: Vec<&str> = clock.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [s] => (0, 0, parse_digits(s)?),
            [m, s] => (0, parse_digits(m)?, parse_digits(s)?),
            [h, m, s] => (parse_digits(h)?, parse_digits(m)?, parse_digits(s)?),
            _ => return Err(DurationFormatError),
        };

        let micros = match fraction {
            None => 0,
            Some(f) if (1..=6).contains(&f.len()) => {
                parse_digits(f)? * 10_i64.pow(6 - f.len() as u32)
            }
            Some(_) => return Err(DurationFormatError),
        };

        let total = days
            .checked_mul(MICROS_PER_DAY)
            .and_then(|t| t.checked_add(hours.checked_mul(MICROS_PER_HOUR)?))
            .and_then(|t| t.checked_add(minutes.checked_mul(MICROS_PER_MINUTE)?))
            .and_then(|t| t.checked_add(seconds.checked_mul(MICROS_PER_SECOND)?))
            .and_then(|t| t.checked_add(micros))
            .ok_or(DurationFormatError)?;

        Ok(Self::from_micros(total))
    }
}

impl fmt::Display for PrepTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.micros / MICROS_PER_DAY;
        let rest = self.micros % MICROS_PER_DAY;
        let hours = rest / MICROS_PER_HOUR;
        let minutes = (rest % MICROS_PER_HOUR) / MICROS_PER_MINUTE;
        let seconds = (rest % MICROS_PER_MINUTE) / MICROS_PER_SECOND;
        let micros = rest % MICROS_PER_SECOND;

        if days > 0 {
            write!(f, "{} ", days)?;
        }
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
        if micros > 0 {
            write!(f, ".{:06}", micros)?;
        }
        Ok(())
    }
}

impl Serialize for PrepTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PrepTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// Postgres keeps months apart from days; a month counts as 30 days here.
impl From<PgInterval> for PrepTime {
    fn from(interval: PgInterval) -> Self {
        let days = i64::from(interval.months) * 30 + i64::from(interval.days);
        Self::from_micros(days * MICROS_PER_DAY + interval.microseconds)
    }
}

impl From<PrepTime> for PgInterval {
    fn from(value: PrepTime) -> Self {
        PgInterval {
            months: 0,
            days: (value.micros / MICROS_PER_DAY) as i32,
            microseconds: value.micros % MICROS_PER_DAY,
        }
    }
}
