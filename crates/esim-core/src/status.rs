//! Lifecycle status model.
//!
//! Upstream systems report status as free text ("Active", "in_use",
//! "CANCELLED", ...). All of that funnels through [`ProfileStatus::classify`],
//! the only place raw status text is interpreted. Past this point the engine
//! deals exclusively with the three-state enum.

use serde::{Deserialize, Serialize};

/// Terminal-state markers, matched before activation markers because several
/// of them ("inactive", "deactivated") contain an activation token as a
/// substring.
const EXPIRED_TOKENS: &[&str] = &[
    "expired",
    "terminated",
    "deactivated",
    "disabled",
    "cancelled",
    "canceled",
    "inactive",
    "deleted",
    "ended",
    "finished",
    "depleted",
];

const ACTIVATED_TOKENS: &[&str] = &[
    "active",
    "activated",
    "enabled",
    "installed",
    "in_use",
    "in use",
    "live",
];

/// Stored lifecycle state of a profile.
///
/// `Generated` covers everything between purchase and installation; an
/// unrecognized upstream status lands here rather than failing the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Generated,
    Activated,
    Expired,
}

impl ProfileStatus {
    /// Classify free-form upstream status text.
    pub fn classify(text: &str) -> ProfileStatus {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return ProfileStatus::Generated;
        }
        if EXPIRED_TOKENS.iter().any(|t| lowered.contains(t)) {
            return ProfileStatus::Expired;
        }
        if ACTIVATED_TOKENS.iter().any(|t| lowered.contains(t)) {
            return ProfileStatus::Activated;
        }
        ProfileStatus::Generated
    }

    /// Merge rank: an activated record outranks both other states, which tie.
    pub fn priority(&self) -> u8 {
        match self {
            ProfileStatus::Activated => 3,
            ProfileStatus::Generated => 2,
            ProfileStatus::Expired => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Generated => "generated",
            ProfileStatus::Activated => "activated",
            ProfileStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-time bucketing of a profile for list views.
///
/// Distinct from [`ProfileStatus`]: a profile whose stored status is still
/// `Generated` but whose expiry has passed is *viewed* as expired without
/// the stored record changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleView {
    Active,
    Queued,
    Expired,
}

impl LifecycleView {
    /// Parse a view filter. Unknown text (including "all") means no filter.
    pub fn parse(text: &str) -> Option<LifecycleView> {
        match text.trim().to_lowercase().as_str() {
            "active" => Some(LifecycleView::Active),
            "queued" => Some(LifecycleView::Queued),
            "expired" => Some(LifecycleView::Expired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleView::Active => "active",
            LifecycleView::Queued => "queued",
            LifecycleView::Expired => "expired",
        }
    }
}

impl std::fmt::Display for LifecycleView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
