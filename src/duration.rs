//! Work duration value type.
//!
//! Durations are stored as integer nanoseconds and travel across the boundary as
//! human-readable strings such as `"2h30m0s"`. Parsing accepts a sequence of
//! decimal numbers (optionally fractional), each followed by a unit: `ns`, `us`
//! (or `µs`), `ms`, `s`, `m` or `h`. Negative durations are rejected.

use crate::errors::{Error, Result};
use sea_orm::DeriveValueType;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, iter::Sum, ops::Add, ops::AddAssign, str::FromStr};

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;

/// Non-negative elapsed time, stored as nanoseconds in a `BIGINT` column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveValueType)]
pub struct WorkDuration(i64);

impl WorkDuration {
    /// Zero duration
    pub const ZERO: Self = Self(0);

    /// Builds a duration from whole hours and minutes.
    #[must_use]
    pub const fn from_hours_minutes(hours: i64, minutes: i64) -> Self {
        Self(hours * NANOS_PER_HOUR + minutes * NANOS_PER_MINUTE)
    }

    /// Builds a duration from a raw nanosecond count, clamping negatives to zero.
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        if nanos < 0 { Self::ZERO } else { Self(nanos) }
    }

    /// Total nanoseconds
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Whether no time has elapsed
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for WorkDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for WorkDuration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for WorkDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for WorkDuration {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Writes `value / scale` with the remainder as a trimmed decimal fraction.
fn write_scaled(f: &mut fmt::Formatter<'_>, value: i64, scale: i64) -> fmt::Result {
    write!(f, "{}", value / scale)?;
    let fraction = value % scale;
    if fraction != 0 {
        let digits = scale.ilog10() as usize;
        let padded = format!("{fraction:0digits$}");
        write!(f, ".{}", padded.trim_end_matches('0'))?;
    }
    Ok(())
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0;
        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < NANOS_PER_SECOND {
            let (scale, unit) = if nanos < NANOS_PER_MICRO {
                (1, "ns")
            } else if nanos < NANOS_PER_MILLI {
                (NANOS_PER_MICRO, "µs")
            } else {
                (NANOS_PER_MILLI, "ms")
            };
            write_scaled(f, nanos, scale)?;
            return f.write_str(unit);
        }

        let hours = nanos / NANOS_PER_HOUR;
        let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
        let seconds = nanos % NANOS_PER_MINUTE;

        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write_scaled(f, seconds, NANOS_PER_SECOND)?;
        f.write_str("s")
    }
}

fn unit_scale(unit: &str) -> Option<i128> {
    let scale = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SECOND,
        "m" => NANOS_PER_MINUTE,
        "h" => NANOS_PER_HOUR,
        _ => return None,
    };
    Some(i128::from(scale))
}

impl FromStr for WorkDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDuration {
            value: s.to_string(),
        };

        let trimmed = s.trim();
        let mut rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if rest == "0" {
            return Ok(Self::ZERO);
        }
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut total: i128 = 0;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            let (number, tail) = rest.split_at(number_len);

            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);
            let scale = unit_scale(unit).ok_or_else(invalid)?;

            let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
            if (whole.is_empty() && fraction.is_empty())
                || !fraction.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }

            let whole: i128 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| invalid())?
            };
            let mut value = whole.checked_mul(scale).ok_or_else(invalid)?;

            let mut place = scale;
            for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
                place /= 10;
                if place == 0 {
                    break;
                }
                value += i128::from(digit) * place;
            }

            total = total.checked_add(value).ok_or_else(invalid)?;
            rest = tail;
        }

        i64::try_from(total).map(Self).map_err(|_| invalid())
    }
}

impl Serialize for WorkDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct WorkDurationVisitor;

impl de::Visitor<'_> for WorkDurationVisitor {
    type Value = WorkDuration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string such as \"2h30m\" or a nanosecond count")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<WorkDuration, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<WorkDuration, E> {
        if v < 0 {
            return Err(E::custom(format!("negative duration: {v}")));
        }
        Ok(WorkDuration(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<WorkDuration, E> {
        i64::try_from(v)
            .map(WorkDuration)
            .map_err(|_| E::custom(format!("duration out of range: {v}")))
    }
}

impl<'de> Deserialize<'de> for WorkDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(WorkDurationVisitor)
    }
}
