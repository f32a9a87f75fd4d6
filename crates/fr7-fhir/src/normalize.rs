//! Value normalizers shared by all extractors
//!
//! HL7 DTM values and French phone numbers arrive in many shapes; these
//! helpers validate and reshape them. A value that fails validation is
//! reported as an error so the caller can drop the field and move on.

use crate::error::ExtractError;
use chrono::{NaiveDate, NaiveDateTime};

/// Parse an HL7 date (`YYYYMMDD` or a longer DTM) into `YYYY-MM-DD`
///
/// The calendar is validated; `20230230` is an error, not a best effort.
pub fn parse_hl7_date(input: &str) -> Result<String, ExtractError> {
    let digits: &str = input.get(0..8).unwrap_or(input);
    let date = NaiveDate::parse_from_str(digits, "%Y%m%d")
        .map_err(|_| ExtractError::InvalidDate(input.to_string()))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Parse an HL7 DTM (`YYYYMMDD[HHMM[SS]][.FFFF][±ZZZZ]`) into ISO-8601
///
/// Minutes and seconds default to zero. A date-only input stays a date. A
/// trailing `±ZZZZ` zone is carried over as `±HH:MM`.
pub fn parse_hl7_datetime(input: &str) -> Result<String, ExtractError> {
    let err = || ExtractError::InvalidDate(input.to_string());

    // split off the timezone, if any
    let (body, zone) = match input.rfind(['+', '-']) {
        Some(pos) if pos >= 8 => input.split_at(pos),
        _ => (input, ""),
    };
    // fractional seconds are accepted and dropped
    let body = body.split('.').next().unwrap_or(body);

    if body.len() < 8 || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }
    if body.len() == 8 {
        return parse_hl7_date(body);
    }

    // pad a partial time out to seconds
    let mut padded = body.to_string();
    while padded.len() < 14 {
        padded.push('0');
    }
    let datetime = NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").map_err(|_| err())?;
    let mut out = datetime.format("%Y-%m-%dT%H:%M:%S").to_string();

    if zone.len() == 5 && zone[1..].chars().all(|c| c.is_ascii_digit()) {
        out.push_str(&format!("{}:{}", &zone[0..3], &zone[3..5]));
    }
    Ok(out)
}

/// Format an ISO-8601 date or datetime back to HL7 DTM form
///
/// Inverse of [`parse_hl7_date`] / [`parse_hl7_datetime`] on the domain
/// `{YYYYMMDD, YYYYMMDDHHMMSS}`.
pub fn format_hl7_datetime(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
}

/// A normalized telephone number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub value: String,
    pub is_mobile: bool,
}

/// Normalize a phone string: keep `[0-9+]`, reject near-empty values,
/// detect French mobile numbers
///
/// Mobility means prefix `06`, `07`, `+336` or `+337` combined with the
/// national (10) or international (12) length.
pub fn normalize_phone(input: &str) -> Result<Phone, ExtractError> {
    let value: String = input.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    if value.len() <= 1 {
        return Err(ExtractError::InvalidPhone(input.to_string()));
    }

    let is_mobile = (value.len() == 10 && (value.starts_with("06") || value.starts_with("07")))
        || (value.len() == 12 && (value.starts_with("+336") || value.starts_with("+337")));

    Ok(Phone { value, is_mobile })
}

/// Leading 8-digit prefix of a token, if the token starts with 8 digits
///
/// A 14-digit DTM qualifies through its date prefix.
pub fn leading_eight_digits(input: &str) -> Option<&str> {
    let prefix = input.get(0..8)?;
    prefix.chars().all(|c| c.is_ascii_digit()).then_some(prefix)
}

/// True when a string looks like a DTM stamp rather than a name
pub fn looks_like_timestamp(input: &str) -> bool {
    input.len() >= 8 && input.chars().all(|c| c.is_ascii_digit())
}
