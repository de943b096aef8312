//! Canonical profile record.
//!
//! One [`Profile`] per physical eSIM. Produced by the ingest pipeline from
//! arbitrary upstream JSON, stored and served as-is. Quota fields are
//! human-readable strings by the time they land here ("5 GB", "750 MB");
//! the raw upstream record is retained in `raw` for debugging and is the
//! only loosely typed field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::{LifecycleView, ProfileStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Carrier identifier as received or synthesized. Display grouping is
    /// the codec's job; identity is the stripped digit string.
    pub iccid: String,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub plan_label: Option<String>,
    /// Total data allowance, e.g. "5 GB". None when upstream never said.
    pub total_quota: Option<String>,
    /// Remaining data allowance, same rendering as `total_quota`.
    pub remaining_quota: Option<String>,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Stamped by the mark-activated transition, never by ingest.
    pub activated_at: Option<DateTime<Utc>>,
    pub duration_days: Option<i64>,
    /// Installation URL or QR payload handed to the device.
    pub install_url: Option<String>,
    pub activation_code: Option<String>,
    /// Original upstream record, kept verbatim for support tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

/// Identity key for an identifier string: digits only, so
/// "8910 1001..." and "89101001..." collide. Falls back to the trimmed
/// original when the identifier carries no digits at all (synthetic
/// placeholder ids).
pub fn identity_key_of(id: &str) -> String {
    let digits = iccid::strip(id);
    if digits.is_empty() {
        id.trim().to_string()
    } else {
        digits
    }
}

impl Profile {
    /// Dedup and lookup key; see [`identity_key_of`].
    pub fn identity_key(&self) -> String {
        identity_key_of(&self.iccid)
    }

    /// Presentation bucket at `now`. A passed expiry forces the expired
    /// bucket no matter what status is stored.
    pub fn view_at(&self, now: DateTime<Utc>) -> LifecycleView {
        if self.status == ProfileStatus::Expired || self.expires_at < now {
            return LifecycleView::Expired;
        }
        match self.status {
            ProfileStatus::Activated => LifecycleView::Active,
            _ => LifecycleView::Queued,
        }
    }

    /// Copy the display fields this record is missing from `other`.
    /// Status, dates, and the identifier are never touched; merge choice
    /// between two records is the caller's problem, this only fills gaps.
    pub fn backfill_from(&mut self, other: &Profile) {
        if self.country_code.is_none() {
            self.country_code = other.country_code.clone();
        }
        if self.country_name.is_none() {
            self.country_name = other.country_name.clone();
        }
        if self.plan_label.is_none() {
            self.plan_label = other.plan_label.clone();
        }
        if self.total_quota.is_none() {
            self.total_quota = other.total_quota.clone();
        }
        if self.remaining_quota.is_none() {
            self.remaining_quota = other.remaining_quota.clone();
        }
        if self.install_url.is_none() {
            self.install_url = other.install_url.clone();
        }
    }

    /// Apply a partial update. Status is deliberately absent from the patch;
    /// lifecycle transitions go through classification or mark-activated.
    pub fn apply_patch(&mut self, patch: &ProfilePatch) {
        if let Some(plan_label) = &patch.plan_label {
            self.plan_label = Some(plan_label.clone());
        }
        if let Some(country_code) = &patch.country_code {
            self.country_code = Some(country_code.clone());
        }
        if let Some(country_name) = &patch.country_name {
            self.country_name = Some(country_name.clone());
        }
        if let Some(total_quota) = &patch.total_quota {
            self.total_quota = Some(total_quota.clone());
        }
        if let Some(remaining_quota) = &patch.remaining_quota {
            self.remaining_quota = Some(remaining_quota.clone());
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(duration_days) = patch.duration_days {
            self.duration_days = Some(duration_days);
        }
        if let Some(install_url) = &patch.install_url {
            self.install_url = Some(install_url.clone());
        }
        if let Some(activation_code) = &patch.activation_code {
            self.activation_code = Some(activation_code.clone());
        }
    }

    /// Transition to `Activated`, stamping `activated_at` on first call.
    pub fn mark_activated(&mut self, now: DateTime<Utc>) {
        self.status = ProfileStatus::Activated;
        if self.activated_at.is_none() {
            self.activated_at = Some(now);
        }
    }
}

/// Partial update body for the update operation. Every field optional;
/// absent fields leave the profile untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub plan_label: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub total_quota: Option<String>,
    pub remaining_quota: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub duration_days: Option<i64>,
    pub install_url: Option<String>,
    pub activation_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(status: ProfileStatus) -> Profile {
        let now = Utc::now();
        Profile {
            iccid: "8910 1001 2345 6780 015".to_string(),
            country_code: Some("US".to_string()),
            country_name: Some("United States".to_string()),
            plan_label: Some("Traveler 5GB".to_string()),
            total_quota: Some("5 GB".to_string()),
            remaining_quota: Some("3.2 GB".to_string()),
            status,
            created_at: now,
            expires_at: now + Duration::days(30),
            activated_at: None,
            duration_days: Some(30),
            install_url: None,
            activation_code: None,
            raw: None,
        }
    }

    #[test]
    fn test_identity_key_strips_formatting() {
        let p = sample(ProfileStatus::Generated);
        assert_eq!(p.identity_key(), "8910100123456780015");
    }

    #[test]
    fn test_identity_key_falls_back_for_digitless_ids() {
        let mut p = sample(ProfileStatus::Generated);
        p.iccid = "  ESIM-PLACEHOLDER  ".to_string();
        assert_eq!(p.identity_key(), "ESIM-PLACEHOLDER");
    }

    #[test]
    fn test_view_at_buckets() {
        let now = Utc::now();
        assert_eq!(
            sample(ProfileStatus::Generated).view_at(now),
            LifecycleView::Queued
        );
        assert_eq!(
            sample(ProfileStatus::Activated).view_at(now),
            LifecycleView::Active
        );
        assert_eq!(
            sample(ProfileStatus::Expired).view_at(now),
            LifecycleView::Expired
        );
    }

    #[test]
    fn test_view_at_passed_expiry_wins() {
        let now = Utc::now();
        let mut p = sample(ProfileStatus::Activated);
        p.expires_at = now - Duration::hours(1);
        assert_eq!(p.view_at(now), LifecycleView::Expired);
    }

    #[test]
    fn test_backfill_fills_only_missing_fields() {
        let mut winner = sample(ProfileStatus::Activated);
        winner.country_code = None;
        winner.remaining_quota = None;
        winner.plan_label = None;

        let mut loser = sample(ProfileStatus::Generated);
        loser.country_code = Some("GB".to_string());
        loser.remaining_quota = Some("900 MB".to_string());
        loser.total_quota = Some("99 GB".to_string());

        winner.backfill_from(&loser);
        assert_eq!(winner.country_code.as_deref(), Some("GB"));
        assert_eq!(winner.remaining_quota.as_deref(), Some("900 MB"));
        assert_eq!(winner.plan_label.as_deref(), Some("Traveler 5GB"));
        // Present fields keep their value.
        assert_eq!(winner.total_quota.as_deref(), Some("5 GB"));
        assert_eq!(winner.status, ProfileStatus::Activated);
    }

    #[test]
    fn test_apply_patch_ignores_absent_fields() {
        let mut p = sample(ProfileStatus::Generated);
        let patch = ProfilePatch {
            remaining_quota: Some("1 GB".to_string()),
            ..Default::default()
        };
        p.apply_patch(&patch);
        assert_eq!(p.remaining_quota.as_deref(), Some("1 GB"));
        assert_eq!(p.plan_label.as_deref(), Some("Traveler 5GB"));
        assert_eq!(p.status, ProfileStatus::Generated);
    }

    #[test]
    fn test_mark_activated_stamps_once() {
        let mut p = sample(ProfileStatus::Generated);
        let first = Utc::now();
        p.mark_activated(first);
        assert_eq!(p.status, ProfileStatus::Activated);
        assert_eq!(p.activated_at, Some(first));

        let later = first + Duration::hours(2);
        p.mark_activated(later);
        assert_eq!(p.activated_at, Some(first));
    }

    #[test]
    fn test_raw_skipped_when_absent() {
        let p = sample(ProfileStatus::Generated);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("raw").is_none());
        assert_eq!(json["status"], "generated");
    }
}
