//! Quota unit inference and rendering.
//!
//! Upstream quota values arrive as decimal MB numbers, GB-scale numbers,
//! byte counts, or strings with an embedded unit ("1.5GB", "500 mb").
//! Everything funnels through [`render_quota`], which produces the short
//! display string the rest of the system treats as opaque text.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// Leading decimal number of a quota string ("1.5GB", "2,5 gb").
    static ref LEADING_NUMBER: Regex = Regex::new(r"^([0-9]+(?:[.,][0-9]+)?)").unwrap();
}

const BYTES_PER_GB: f64 = 1e9;
const BYTES_PER_MB: f64 = 1e6;
const MB_PER_GB: f64 = 1000.0;
/// Bare numbers at or above this magnitude are byte counts, not MB figures.
const BYTE_MAGNITUDE: f64 = 1e7;

/// Render one upstream quota value as display text.
///
/// `byte_hint` marks values read from an explicit byte-count field; those
/// are rescaled regardless of magnitude. Returns None for values that
/// cannot carry a quota at all (null, bool, nested structures, blank text).
pub fn render_quota(value: &Value, byte_hint: bool) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().map(|n| render_numeric(n, byte_hint)),
        Value::String(s) => render_text(s, byte_hint),
        _ => None,
    }
}

fn render_text(text: &str, byte_hint: bool) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered.contains("gb") {
        if let Some(n) = leading_number(trimmed) {
            return Some(format_amount(n, "GB"));
        }
    } else if lowered.contains("mb") {
        if let Some(n) = leading_number(trimmed) {
            return Some(format_amount(n, "MB"));
        }
    } else if let Ok(n) = trimmed.parse::<f64>() {
        return Some(render_numeric(n, byte_hint));
    }
    // Not numeric and no recognized unit: pass the text through.
    Some(trimmed.to_string())
}

fn render_numeric(n: f64, byte_hint: bool) -> String {
    if byte_hint || n >= BYTE_MAGNITUDE {
        if n >= BYTES_PER_GB {
            return format_amount(n / BYTES_PER_GB, "GB");
        }
        return format_amount(n / BYTES_PER_MB, "MB");
    }
    if n >= MB_PER_GB {
        return format_amount(n / MB_PER_GB, "GB");
    }
    if n >= 1.0 {
        return format_amount(n, "MB");
    }
    // Below one the scale is unknowable; render the number as-is.
    trim_number(n)
}

fn leading_number(text: &str) -> Option<f64> {
    let m = LEADING_NUMBER.captures(text)?;
    m.get(1)?.as_str().replace(',', ".").parse().ok()
}

fn format_amount(n: f64, unit: &str) -> String {
    format!("{} {}", trim_number(n), unit)
}

/// Whole numbers render without a decimal point; fractions keep at most
/// two places with trailing zeros dropped.
fn trim_number(n: f64) -> String {
    if (n - n.round()).abs() < 1e-9 {
        format!("{}", n.round() as i64)
    } else {
        let s = format!("{:.2}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
