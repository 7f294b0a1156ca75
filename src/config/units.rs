//! Parsing of human-written durations and byte sizes.

use crate::error::{Error, Result};
use std::time::Duration;

/// Parses a Go-style duration such as `250ms`, `1.5s` or `1m30s`.
///
/// A bare `0` is accepted and means "no duration". Units: `ns`, `us`/`µs`,
/// `ms`, `s`, `m`, `h`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(Error::Config("empty duration".to_string()));
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::Config(format!("missing unit in duration {:?}", input)))?;
        if num_end == 0 {
            return Err(Error::Config(format!("invalid duration {:?}", input)));
        }
        let value: f64 = rest[..num_end]
            .parse()
            .map_err(|_| Error::Config(format!("invalid duration {:?}", input)))?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            other => {
                return Err(Error::Config(format!(
                    "unknown unit {:?} in duration {:?}",
                    other, input
                )));
            }
        };
        total += value * nanos_per_unit;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(total.round() as u64))
}

/// Parses a byte size with an optional binary suffix: `4096`, `512K`, `4MB`,
/// `1GiB`. Suffixes are case-insensitive and 1024-based.
pub fn parse_size(input: &str) -> Result<u64> {
    let s = input.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);
    if number.is_empty() {
        return Err(Error::Config(format!("invalid size {:?}", input)));
    }
    let value: f64 = number
        .parse()
        .map_err(|_| Error::Config(format!("invalid size {:?}", input)))?;

    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        other => {
            return Err(Error::Config(format!(
                "unknown size suffix {:?} in {:?}",
                other, input
            )));
        }
    };

    let bytes = (value * multiplier as f64).round();
    if bytes < 1.0 {
        return Err(Error::Config(format!("size {:?} is less than one byte", input)));
    }
    Ok(bytes as u64)
}
