// SPDX-License-Identifier: GPL-3.0-only

//! Human-readable size rendering and parsing for operator-facing output

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("invalid size '{0}'")]
    Invalid(String),

    #[error("invalid size unit '{0}'")]
    InvalidUnit(String),
}

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Render a byte count as a human-readable string (e.g. `1.50 GB`).
pub fn bytes_to_pretty(bytes: u64) -> String {
    let mut steps = 0;
    let mut val = bytes as f64;

    while val >= 1024. && steps < UNITS.len() - 1 {
        val /= 1024.;
        steps += 1;
    }

    format!("{:.2} {}", val, UNITS[steps])
}

/// Parse a human-readable size ("10M", "1.5 GB", "512") into bytes.
///
/// Units are single letters or letter pairs, binary-multiplied; a bare
/// number is taken as bytes.
pub fn pretty_to_bytes(pretty: &str) -> Result<u64, SizeError> {
    let trimmed = pretty.trim();
    if trimmed.is_empty() {
        return Err(SizeError::Invalid(pretty.to_string()));
    }

    let split = trimmed
        .find(|ch: char| ch.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let val: f64 = number
        .trim()
        .parse()
        .map_err(|_| SizeError::Invalid(pretty.to_string()))?;

    let exponent = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 0,
        "K" | "KB" | "KIB" => 1,
        "M" | "MB" | "MIB" => 2,
        "G" | "GB" | "GIB" => 3,
        "T" | "TB" | "TIB" => 4,
        "P" | "PB" | "PIB" => 5,
        other => return Err(SizeError::InvalidUnit(other.to_string())),
    };

    Ok((val * 1024_f64.powi(exponent)) as u64)
}
