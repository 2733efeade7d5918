// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Go-style duration parsing for TTL annotations.
//!
//! Accepts the duration syntax used throughout the Kubernetes ecosystem: an optional
//! sign followed by one or more `<number><unit>` terms, e.g. `300ms`, `-1.5h`, `2h45m`.
//! Numbers may carry a fractional part.

use anyhow::{bail, Context, Result};

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Fraction digits beyond this cannot change a nanosecond result for any unit.
const MAX_FRACTION_DIGITS: u32 = 20;

/// Parse a Go-style duration string into signed nanoseconds.
///
/// Supported units: `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`.
///
/// # Examples
///
/// ```
/// use dns_endpoints::annotations::duration::parse_duration_nanos;
///
/// assert_eq!(parse_duration_nanos("1h30m").unwrap(), 5_400_000_000_000);
/// assert_eq!(parse_duration_nanos("-1.5s").unwrap(), -1_500_000_000);
/// assert_eq!(parse_duration_nanos("0").unwrap(), 0);
///
/// assert!(parse_duration_nanos("").is_err());
/// assert!(parse_duration_nanos("10").is_err());  // Missing unit
/// assert!(parse_duration_nanos("10d").is_err()); // Unknown unit
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The string is empty or a term has no digits
/// - A term has a missing or unknown unit
/// - The total does not fit in a signed 64-bit nanosecond count
pub fn parse_duration_nanos(duration_str: &str) -> Result<i64> {
    let (negative, mut rest) = match duration_str.as_bytes().first() {
        Some(b'-') => (true, &duration_str[1..]),
        Some(b'+') => (false, &duration_str[1..]),
        _ => (false, duration_str),
    };

    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        bail!("Invalid duration '{duration_str}'");
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (nanos, remaining) = parse_term(rest)
            .with_context(|| format!("Invalid duration '{duration_str}'"))?;
        total = total
            .checked_add(nanos)
            .context("Duration value too large (overflow)")?;
        rest = remaining;
    }

    let limit = if negative {
        i64::MAX as u128 + 1
    } else {
        i64::MAX as u128
    };
    if total > limit {
        bail!("Duration '{duration_str}' is out of range");
    }

    // total <= 2^63 here, so the conversion through i128 is exact
    let signed = if negative {
        -(total as i128)
    } else {
        total as i128
    };
    i64::try_from(signed).context("Duration value too large (overflow)")
}

/// Parses one `<number><unit>` term and returns its nanoseconds and the unparsed rest.
fn parse_term(input: &str) -> Result<(u128, &str)> {
    let int_end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (int_digits, mut rest) = input.split_at(int_end);

    let mut frac_digits = "";
    if let Some(after_dot) = rest.strip_prefix('.') {
        let frac_end = after_dot
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_dot.len());
        frac_digits = &after_dot[..frac_end];
        rest = &after_dot[frac_end..];
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        bail!("expected a number");
    }

    let unit_end = rest
        .find(|c: char| c == '.' || c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (unit, rest) = rest.split_at(unit_end);

    let scale = match unit {
        "ns" => 1,
        "us" | "\u{00b5}s" | "\u{03bc}s" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SECOND,
        "m" => NANOS_PER_MINUTE,
        "h" => NANOS_PER_HOUR,
        "" => bail!("missing unit"),
        other => bail!("unknown unit '{other}'"),
    };

    let whole: u128 = if int_digits.is_empty() {
        0
    } else {
        int_digits.parse().context("Duration value too large (overflow)")?
    };

    let mut nanos = whole
        .checked_mul(scale)
        .context("Duration value too large (overflow)")?;

    if !frac_digits.is_empty() {
        let used = &frac_digits[..frac_digits.len().min(MAX_FRACTION_DIGITS as usize)];
        let numerator: u128 = used.parse().context("invalid fraction")?;
        let denominator = 10u128.pow(used.len() as u32);
        nanos = nanos
            .checked_add(numerator * scale / denominator)
            .context("Duration value too large (overflow)")?;
    }

    Ok((nanos, rest))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
