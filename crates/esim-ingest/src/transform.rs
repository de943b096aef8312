//! Raw record to canonical [`Profile`] mapping.
//!
//! One raw record in, one profile out, never an error: a field that is
//! missing or malformed falls down its chain and lands on a default. The
//! original record is kept on the profile for traceability.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use esim_core::{Profile, ProfileStatus};

use crate::fields;
use crate::payload::RawRecord;
use crate::units;

/// Fallback validity window when upstream provides neither an expiry date
/// nor a duration.
const DEFAULT_HORIZON_DAYS: i64 = 7;

/// Durations longer than a century read as upstream garbage and are
/// discarded like any other unparseable value.
const MAX_DURATION_DAYS: i64 = 36_500;

/// Epoch values at or above this magnitude are milliseconds, below it
/// seconds. Millisecond stamps crossed 1e12 in 2001; second stamps stay
/// under 1e11 for roughly the next three millennia.
const EPOCH_MILLIS_CUTOFF: f64 = 1e12;

/// Map one flattened record to a canonical profile.
pub fn transform_record(record: &RawRecord, now: DateTime<Utc>) -> Profile {
    let value = &record.value;

    let status_text = first_text(value, fields::STATUS_FIELDS)
        .or_else(|| record.bucket.map(|b| b.as_str().to_string()));
    let status = status_text
        .map(|t| ProfileStatus::classify(&t))
        .unwrap_or(ProfileStatus::Generated);

    let created_at = first_present(value, fields::CREATED_FIELDS)
        .and_then(parse_date)
        .unwrap_or(now);
    let duration_days = first_present(value, fields::DURATION_FIELDS).and_then(parse_days);

    // Checked arithmetic: a created date near the edge of the representable
    // range must degrade, not abort the whole ingest.
    let mut expires_at = first_present(value, fields::EXPIRY_FIELDS)
        .and_then(parse_date)
        .or_else(|| {
            duration_days.and_then(|d| created_at.checked_add_signed(Duration::days(d)))
        })
        .or_else(|| created_at.checked_add_signed(Duration::days(DEFAULT_HORIZON_DAYS)))
        .unwrap_or(created_at);
    // Status is authoritative over date arithmetic when they disagree.
    if status == ProfileStatus::Expired && expires_at > now {
        expires_at = now - Duration::seconds(1);
    }

    let iccid = first_text(value, fields::IDENTIFIER_FIELDS)
        .unwrap_or_else(|| format!("ESIM-{}", record.ordinal));

    let mut country_code = first_text(value, fields::COUNTRY_CODE_FIELDS);
    let mut country_name = first_text(value, fields::COUNTRY_NAME_FIELDS);
    if country_code.is_none() || country_name.is_none() {
        // The identifier prefix can stand in for missing country fields.
        if let Ok(info) = iccid::parse(&iccid) {
            country_code = country_code.or(Some(info.country_code));
            country_name = country_name.or(Some(info.country_name));
        }
    }

    Profile {
        iccid,
        country_code,
        country_name,
        plan_label: first_text(value, fields::PLAN_LABEL_FIELDS),
        total_quota: first_quota(value, fields::TOTAL_QUOTA_FIELDS),
        remaining_quota: first_quota(value, fields::REMAINING_QUOTA_FIELDS),
        status,
        created_at,
        expires_at,
        activated_at: None,
        duration_days,
        install_url: first_text(value, fields::INSTALL_URL_FIELDS),
        activation_code: None,
        raw: Some(value.clone()),
    }
}

/// First non-null value along a chain.
fn first_present<'a>(value: &'a Value, chain: &[&str]) -> Option<&'a Value> {
    chain
        .iter()
        .find_map(|name| value.get(*name).filter(|v| !v.is_null()))
}

/// First non-blank text along a chain. Numbers stringify (identifiers in
/// particular sometimes arrive as JSON numbers).
fn first_text(value: &Value, chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|name| match value.get(*name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Pick the first present quota value, then render it. The pick and the
/// rendering are separate steps: a present-but-unusable value ends the
/// chain rather than letting a later field shadow it.
fn first_quota(value: &Value, chain: &[(&str, bool)]) -> Option<String> {
    let (picked, byte_hint) = chain.iter().find_map(|(name, hint)| {
        value.get(*name).filter(|v| !v.is_null()).map(|v| (v, *hint))
    })?;
    units::render_quota(picked, byte_hint)
}

/// Parse a date in any upstream spelling: RFC 3339, bare `YYYY-MM-DD`,
/// or an epoch number (seconds or milliseconds, numeric strings included).
/// Unparseable values are discarded.
fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
            }
            s.parse::<f64>().ok().and_then(parse_epoch)
        }
        Value::Number(n) => n.as_f64().and_then(parse_epoch),
        _ => None,
    }
}

fn parse_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    if n >= EPOCH_MILLIS_CUTOFF {
        Utc.timestamp_millis_opt(n as i64).single()
    } else {
        Utc.timestamp_opt(n as i64, 0).single()
    }
}

/// Duration in days from a number or a "30 days"-style string. Values
/// outside `1..=MAX_DURATION_DAYS` are discarded.
fn parse_days(value: &Value) -> Option<i64> {
    let days = match value {
        Value::Number(n) => n.as_f64().map(|n| n.round() as i64),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    };
    days.filter(|d| (1..=MAX_DURATION_DAYS).contains(d))
}
