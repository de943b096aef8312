//! Upstream ingest pipeline: shape probing, record transformation, merge.
//!
//! The provisioning API returns profile lists in whatever shape the upstream
//! vendor last deployed. This crate turns any of those payloads into the
//! canonical deduplicated profile list in three stages, none of which can
//! fail; malformed input degrades field by field instead.
//!
//! # Example
//!
//! ```ignore
//! use esim_ingest::ingest_payload;
//!
//! let payload = serde_json::json!({
//!     "active": [{"iccid": "8910100123456780015", "remaining_data": 1500}],
//!     "queued": [{"iccid": "8910100123456780015"}]
//! });
//! let profiles = ingest_payload(&payload, chrono::Utc::now());
//! assert_eq!(profiles.len(), 1);
//! ```

pub mod dedupe;
pub mod fields;
pub mod payload;
pub mod transform;
pub mod units;

use chrono::{DateTime, Utc};
use serde_json::Value;

use esim_core::Profile;

pub use dedupe::{dedupe_by_id, merge_profiles};
pub use payload::{flatten_payload, BucketTag, RawRecord};
pub use transform::transform_record;
pub use units::render_quota;

/// Run the full pipeline: flatten, transform each record, merge duplicates.
///
/// An unrecognized payload shape produces an empty list, the valid
/// "no profiles" outcome.
pub fn ingest_payload(payload: &Value, now: DateTime<Utc>) -> Vec<Profile> {
    let records = flatten_payload(payload);
    let profiles = records
        .iter()
        .map(|record| transform_record(record, now))
        .collect();
    merge_profiles(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esim_core::ProfileStatus;
    use serde_json::json;

    #[test]
    fn test_pipeline_end_to_end() {
        let payload = json!({
            "profiles": [
                {"iccid": "8910100123456780015", "status": "active", "total_data": 5000},
                {"iccid": "8944200987654320010", "status": "pending"}
            ]
        });
        let profiles = ingest_payload(&payload, Utc::now());
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].status, ProfileStatus::Activated);
        assert_eq!(profiles[0].total_quota.as_deref(), Some("5 GB"));
        assert_eq!(profiles[1].status, ProfileStatus::Generated);
    }

    #[test]
    fn test_empty_payload_is_not_an_error() {
        assert!(ingest_payload(&json!({}), Utc::now()).is_empty());
    }
}
