// Input parsing and validation utilities

use anyhow::Result;
use regex::Regex;

/// True when the string is empty after trimming. Form inputs arrive as raw
/// strings, so "required" always means "non-blank".
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Parse a money amount typed into a form field.
///
/// Rejects blank and non-numeric input; the caller decides whether that is a
/// hard error (price) or coerces to zero (deposit, shipping).
pub fn parse_money(raw: &str) -> Result<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Amount is required"));
    }

    let value: f64 = s
        .parse()
        .map_err(|_| anyhow::anyhow!("'{}' is not a valid amount", s))?;
    if !value.is_finite() {
        return Err(anyhow::anyhow!("'{}' is not a valid amount", s));
    }

    Ok(value)
}

/// Money coercion for optional amounts: blank or invalid input becomes 0.
pub fn money_or_zero(raw: &str) -> f64 {
    parse_money(raw).unwrap_or(0.0)
}

/// Minimum rental duration in periods; blank or invalid input falls back to 1.
pub fn min_duration_or_default(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(1)
}

/// True when the string is a canonical `YYYY-MM-DD` date as produced by a
/// date input. Used for diagnostics only; the backend accepts the raw string.
pub fn is_canonical_date(raw: &str) -> bool {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").is_ok()
}

/// Validate a resource id before it is interpolated into a URL path
/// (e.g. `/listings/:id`).
///
/// Security: ids come back from the backend but may also be pasted into an
/// edit route by a user. Only simple opaque ids (letters/digits/underscore/
/// hyphen) are accepted; anything else is rejected rather than escaped.
pub fn validate_resource_id(id: &str) -> Result<&str> {
    let s = id.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Resource id is required"));
    }

    let id_re = Regex::new(r"^[A-Za-z0-9_-]+$")
        .map_err(|e| anyhow::anyhow!("Internal error: failed to compile id regex: {}", e))?;
    if !id_re.is_match(s) {
        return Err(anyhow::anyhow!(
            "Resource id contains invalid characters: '{}'",
            s
        ));
    }

    Ok(s)
}
