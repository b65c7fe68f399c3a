//! Go-style duration strings (`"30s"`, `"1h30m"`, `"500ms"`) used by the config
//! file, plus the matching human-readable formatting used in summaries.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

const NANOS_PER_MICRO: f64 = 1_000.0;
const NANOS_PER_MILLI: f64 = 1_000_000.0;
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("duration string is empty")]
    Empty,
    #[error("invalid number in duration {input:?}")]
    InvalidNumber { input: String },
    #[error("missing unit in duration {input:?}")]
    MissingUnit { input: String },
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
}

pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = text;
    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| DurationParseError::InvalidNumber {
                input: input.to_owned(),
            })?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, remainder) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit {
                input: input.to_owned(),
            });
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_owned(),
            input: input.to_owned(),
        })?;

        total_nanos += value * scale;
        rest = remainder;
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60.0 * NANOS_PER_SEC),
        "h" => Some(3_600.0 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Formats a duration as `1h2m3s`, `4m0s`, `1.5s` or `250ms`, truncated to
/// millisecond precision.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_owned();
    }
    if duration < Duration::from_secs(1) {
        let millis = duration.as_millis();
        if millis > 0 {
            return format!("{millis}ms");
        }
        return format!("{}µs", duration.as_micros());
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let secs = total_secs % 60;
    let millis = duration.subsec_millis();

    let seconds = if millis == 0 {
        format!("{secs}s")
    } else {
        let fraction = format!("{millis:03}");
        format!("{secs}.{}s", fraction.trim_end_matches('0'))
    };

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}")
    } else {
        seconds
    }
}

/// Serde adapter for fields written as duration strings.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}
