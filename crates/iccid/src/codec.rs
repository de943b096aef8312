//! Validation, display formatting, and segment parsing.

use crate::luhn;
use crate::prefixes;
use serde::Serialize;
use thiserror::Error;

/// Accepted identifier lengths after stripping separators.
const MIN_DIGITS: usize = 19;
const MAX_DIGITS: usize = 20;

/// Width of the carrier prefix segment.
const PREFIX_DIGITS: usize = 7;

/// Width of the plan id segment (the digits just before the checksum).
const PLAN_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IccidError {
    #[error("empty identifier")]
    Empty,
    #[error("expected 19-20 digits, got {0}")]
    BadLength(usize),
    #[error("checksum digit does not verify")]
    BadChecksum,
}

/// Parsed view of a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IccidInfo {
    /// 7-digit carrier prefix.
    pub prefix: String,
    pub country_code: String,
    pub country_name: String,
    pub provider: String,
    /// 3-digit plan id preceding the checksum digit.
    pub plan_id: String,
    /// Display form, digits grouped in blocks of four.
    pub formatted: String,
    /// Raw digit string with separators stripped.
    pub raw: String,
}

/// Strip everything but ASCII digits. Identity and equality of identifiers
/// are defined on this form.
pub fn strip(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Whether the input is a well-formed identifier: 19-20 digits ending in a
/// valid mod-10 checksum. Separators are ignored.
pub fn validate(input: &str) -> bool {
    let digits = strip(input);
    (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) && luhn::verify(&digits)
}

/// Group digits in blocks of four separated by spaces.
///
/// Formatting never validates; malformed input is still grouped so the
/// display layer can render a best-effort value. Idempotent on its own
/// output because separators are stripped first.
pub fn format(input: &str) -> String {
    let digits = strip(input);
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Slice a valid identifier into its fixed-width segments and resolve the
/// prefix against the carrier table. Fails closed when [`validate`] fails.
pub fn parse(input: &str) -> Result<IccidInfo, IccidError> {
    let digits = strip(input);
    if digits.is_empty() {
        return Err(IccidError::Empty);
    }
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return Err(IccidError::BadLength(digits.len()));
    }
    if !luhn::verify(&digits) {
        return Err(IccidError::BadChecksum);
    }

    let prefix = &digits[..PREFIX_DIGITS];
    // Plan id sits immediately before the trailing checksum digit, so it is
    // sliced from the end and tolerates both 19- and 20-digit identifiers.
    let plan_id = &digits[digits.len() - 1 - PLAN_DIGITS..digits.len() - 1];
    let entry = prefixes::lookup_prefix(prefix);

    Ok(IccidInfo {
        prefix: prefix.to_string(),
        country_code: entry.country_code.to_string(),
        country_name: entry.country_name.to_string(),
        provider: entry.provider.to_string(),
        plan_id: plan_id.to_string(),
        formatted: format(&digits),
        raw: digits,
    })
}
