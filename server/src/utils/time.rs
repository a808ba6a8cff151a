//! Time utility functions

use std::time::Duration;

use anyhow::{Result, bail};

/// Parse a duration string of the form `"90s"`, `"2m"`, `"1h"` or `"500ms"`.
///
/// A bare number is rejected; the unit suffix is required so config values
/// are unambiguous.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        bail!("empty duration");
    }

    let (value, unit) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => s.split_at(idx),
        None => bail!("duration '{}' is missing a unit (s, m, h, ms)", s),
    };

    let value: f64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid duration value in '{}'", s))?;

    let secs = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => bail!("unknown duration unit '{}' in '{}'", unit, s),
    };

    if !secs.is_finite() || secs < 0.0 {
        bail!("duration '{}' is out of range", s);
    }

    Ok(Duration::from_secs_f64(secs))
}
