// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Byte-size parsing and formatting.
//!
//! All units are binary: `K`, `KB` and `KiB` all mean 1024 bytes, `G`, `GB`
//! and `GiB` all mean 1024³ bytes, and so on. Units are case-insensitive and
//! may be separated from the number by whitespace. A bare number is a byte
//! count and must be a non-negative integer; fractional numbers are accepted
//! with an explicit unit and rounded down to whole bytes.

use crate::error::{ConfigError, Result};
use serde_json::Value;

const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

fn unit_multiplier(unit: &str) -> Option<u64> {
    let shift = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        "t" | "tb" | "tib" => 40,
        "p" | "pb" | "pib" => 50,
        _ => return None,
    };
    Some(1u64 << shift)
}

/// Parse a size such as `"9GB"`, `"512 MiB"` or `"8589934592"` into bytes.
///
/// Returns a short reason on failure.
pub fn parse_byte_size(input: &str) -> std::result::Result<u64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty size".to_string());
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let unit = unit.trim();

    if number.is_empty() {
        return Err("missing numeric value".to_string());
    }
    let multiplier = unit_multiplier(unit).ok_or_else(|| format!("unknown unit {:?}", unit))?;

    if !number.contains('.') {
        let value: u64 = number
            .parse()
            .map_err(|e| format!("invalid number {:?}: {}", number, e))?;
        return value
            .checked_mul(multiplier)
            .ok_or_else(|| "size overflows 64 bits".to_string());
    }

    if unit.is_empty() {
        return Err("a byte count without a unit must be a whole number".to_string());
    }
    let value: f64 = number
        .parse()
        .map_err(|e| format!("invalid number {:?}: {}", number, e))?;
    let bytes = (value * multiplier as f64).floor();
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err("size overflows 64 bits".to_string());
    }
    Ok(bytes as u64)
}

/// Parse a memory limit value taken from a JSON document.
///
/// Accepts non-negative integers and size strings; `name` is only used for
/// error reporting.
pub fn parse_memory_limit(name: &str, value: &Value) -> Result<u64> {
    let invalid = |value: String, reason: String| ConfigError::InvalidMemoryLimit {
        name: name.to_string(),
        value,
        reason,
    };

    match value {
        Value::String(s) => parse_byte_size(s).map_err(|reason| invalid(s.clone(), reason)),
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            invalid(
                n.to_string(),
                "expected a non-negative integer byte count".to_string(),
            )
        }),
        other => Err(invalid(
            other.to_string(),
            "expected a size string or byte count".to_string(),
        )),
    }
}

/// Format a byte count using binary units, e.g. `4.88 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a fractional byte count, as produced by averaging.
pub fn format_bytes_f64(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return format_bytes(0);
    }
    format_bytes(bytes.round() as u64)
}
