//! Duration strings in the configuration wire format.
//!
//! Durations are written the way operators write them: a signed sequence of
//! decimal values with unit suffixes, such as `"1h"`, `"2h30m"`, or `"300ms"`.
//! Formatting always emits the unit ladder down to seconds (`"1h0m0s"`), with
//! sub-second spans rendered in the largest exact unit.

use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { input: String, unit: String },

    #[error("duration {0:?} out of range")]
    OutOfRange(String),
}

const NANOS_PER_US: i128 = 1_000;
const NANOS_PER_MS: i128 = 1_000_000;
const NANOS_PER_SEC: i128 = 1_000_000_000;
const NANOS_PER_MIN: i128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MIN;

fn unit_nanos(unit: &str) -> Option<i128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_US),
        "ms" => Some(NANOS_PER_MS),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MIN),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// Parses a duration string such as `"1h"`, `"-5m30s"`, or `"1.5h"`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let whole: i128 = if int_len > 0 {
            rest[..int_len]
                .parse()
                .map_err(|_| DurationError::OutOfRange(input.to_string()))?
        } else {
            0
        };
        rest = &rest[int_len..];

        let mut fraction = 0.0f64;
        let mut has_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            if frac_len == 0 && int_len == 0 {
                return Err(DurationError::Invalid(input.to_string()));
            }
            let mut scale = 1.0f64;
            for digit in after_dot[..frac_len].bytes() {
                scale /= 10.0;
                fraction += f64::from(digit - b'0') * scale;
            }
            has_fraction = frac_len > 0;
            rest = &after_dot[frac_len..];
        }
        if int_len == 0 && !has_fraction {
            return Err(DurationError::Invalid(input.to_string()));
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let nanos = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            input: input.to_string(),
            unit: unit.to_string(),
        })?;

        total += whole
            .checked_mul(nanos)
            .ok_or_else(|| DurationError::OutOfRange(input.to_string()))?;
        if has_fraction {
            total += (fraction * nanos as f64) as i128;
        }
        if total > i64::MAX as i128 {
            return Err(DurationError::OutOfRange(input.to_string()));
        }
    }

    let nanos = total as i64;
    Ok(Duration::nanoseconds(if negative { -nanos } else { nanos }))
}

fn push_decimal(out: &mut String, whole: u64, frac: u64, frac_width: usize) {
    if frac == 0 {
        out.push_str(&whole.to_string());
        return;
    }
    let mut digits = format!("{frac:0frac_width$}");
    while digits.ends_with('0') {
        digits.pop();
    }
    out.push_str(&format!("{whole}.{digits}"));
}

/// Formats a duration the way [`parse_duration`] reads it back.
///
/// Spans of a second or more always spell out the full ladder (`"1h0m0s"`,
/// `"7m0s"`); shorter spans use the largest unit that keeps the value exact.
pub fn format_duration(d: Duration) -> String {
    let total = match d.num_nanoseconds() {
        Some(n) => n,
        None => i64::MAX,
    };
    if total == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }
    let nanos = total.unsigned_abs();

    if nanos < NANOS_PER_SEC as u64 {
        if nanos < NANOS_PER_US as u64 {
            out.push_str(&format!("{nanos}ns"));
        } else if nanos < NANOS_PER_MS as u64 {
            push_decimal(&mut out, nanos / 1_000, nanos % 1_000, 3);
            out.push_str("µs");
        } else {
            push_decimal(&mut out, nanos / 1_000_000, nanos % 1_000_000, 6);
            out.push_str("ms");
        }
        return out;
    }

    let secs = nanos / NANOS_PER_SEC as u64;
    let frac = nanos % NANOS_PER_SEC as u64;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    push_decimal(&mut out, seconds, frac, 9);
    out.push('s');
    out
}
