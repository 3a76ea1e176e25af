//! Conversion of raw Cli/env strings and decoded JSON values into typed flag [`Value`]s.
use std::time::Duration;
use thiserror::Error;

use crate::model::{Kind, Value};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// A raw input could not be converted into the expected [`Kind`].
///
/// The flag name is not known at this level; callers attach it (see `ParseError::InvalidValue`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{raw}' is not a valid {kind}")]
pub struct ConversionError {
    raw: String,
    kind: Kind,
}

impl ConversionError {
    pub(crate) fn new(raw: impl Into<String>, kind: Kind) -> Self {
        Self {
            raw: raw.into(),
            kind,
        }
    }

    /// The offending input, as written (JSON inputs are rendered back to JSON text).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The kind the input was expected to convert into.
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Convert a raw string from the command line or the environment into a value of `kind`.
pub fn from_str(kind: Kind, raw: &str) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::new(raw, kind);

    match kind {
        Kind::String => Ok(Value::String(raw.to_string())),
        Kind::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        Kind::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(invalid),
        Kind::Float64 => raw.parse::<f64>().map(Value::Float64).map_err(|_| invalid()),
        Kind::Duration => parse_duration(raw)
            .map(Value::Duration)
            .ok_or_else(invalid),
        Kind::StringList => Ok(Value::StringList(parse_list(raw))),
    }
}

/// Convert a decoded JSON value from the configuration file into a value of `kind`.
///
/// Only the JSON-native representation of each kind is accepted; ex: `"8080"` is not an int.
/// Durations have no JSON-native form, so they are given as strings and parsed like the Cli does.
pub fn from_json(kind: Kind, json: &serde_json::Value) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::new(json.to_string(), kind);

    match (kind, json) {
        (Kind::String, serde_json::Value::String(value)) => Ok(Value::String(value.clone())),
        (Kind::Int, serde_json::Value::Number(number)) => {
            json_int(number).map(Value::Int).ok_or_else(invalid)
        }
        (Kind::Bool, serde_json::Value::Bool(value)) => Ok(Value::Bool(*value)),
        (Kind::Float64, serde_json::Value::Number(number)) => {
            number.as_f64().map(Value::Float64).ok_or_else(invalid)
        }
        (Kind::Duration, serde_json::Value::String(value)) => parse_duration(value)
            .map(Value::Duration)
            .ok_or_else(invalid),
        (Kind::StringList, serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .map(Value::StringList)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

// Fractional numbers truncate toward zero, but must still land inside the i64 range.
fn json_int(number: &serde_json::Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }

    if number.is_u64() {
        return None;
    }

    let truncated = number.as_f64()?.trunc();

    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

/// Parse the canonical boolean literals: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Split a comma separated list, dropping empty segments.
///
/// `"a,,b"` yields `["a", "b"]` and both `""` and `","` yield an empty list.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a compound duration such as `1h30m`, `250ms` or `1.5s`.
///
/// The grammar is a sequence of decimal numbers (optionally fractional), each followed by a unit:
/// `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
/// A bare `0` is accepted without a unit.
/// Negative durations cannot be represented, so any non-zero negative input is rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let duration = parse_unsigned_duration(unsigned)?;

    if negative && !duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

fn parse_unsigned_duration(mut rest: &str) -> Option<Duration> {
    if rest == "0" {
        return Some(Duration::ZERO);
    }

    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let whole_length = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (whole, after) = rest.split_at(whole_length);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after) => {
                let fraction_length = after.bytes().take_while(u8::is_ascii_digit).count();
                after.split_at(fraction_length)
            }
            None => ("", after),
        };

        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_length = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_length);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SECOND,
            "m" => 60 * NANOS_PER_SECOND,
            "h" => 3_600 * NANOS_PER_SECOND,
            _ => return None,
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().ok()?
        };
        let mut nanos = whole.checked_mul(scale)?;

        // Digits beyond nanosecond precision of the largest unit cannot contribute.
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in fraction.bytes().take(18) {
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }
        nanos = nanos.checked_add(numerator * scale / denominator)?;

        total = total.checked_add(nanos)?;
        rest = after;
    }

    if total > i64::MAX as u128 {
        return None;
    }

    let seconds = u64::try_from(total / NANOS_PER_SECOND).ok()?;
    let sub_nanos = u32::try_from(total % NANOS_PER_SECOND).ok()?;
    Some(Duration::new(seconds, sub_nanos))
}

/// Render a duration in the same grammar [`parse_duration`] accepts, ex: `1h30m0s`, `250ms`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        return "0s".to_string();
    } else if nanos < 1_000 {
        return format!("{nanos}ns");
    } else if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000, 3));
    } else if nanos < NANOS_PER_SECOND {
        return format!("{}ms", decimal(nanos, 1_000_000, 6));
    }

    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = decimal(
        u128::from(total_seconds % 60) * NANOS_PER_SECOND + u128::from(duration.subsec_nanos()),
        NANOS_PER_SECOND,
        9,
    );

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn decimal(value: u128, unit: u128, digits: usize) -> String {
    let whole = value / unit;
    let remainder = value % unit;

    if remainder == 0 {
        whole.to_string()
    } else {
        let fraction = format!("{remainder:0digits$}");
        format!("{whole}.{}", fraction.trim_end_matches('0'))
    }
}
