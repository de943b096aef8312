//! Upstream payload shape probing.
//!
//! The provisioning API does not commit to a response shape: sometimes a bare
//! array, sometimes an object with the list under a named field, sometimes
//! parallel status-bucket keys, sometimes all of that nested under a generic
//! `data` wrapper. [`flatten_payload`] probes the known shapes in priority
//! order and flattens whatever it finds into a uniform record sequence.
//! An unrecognized shape yields an empty sequence, which is a valid
//! "no profiles" result rather than an error.

use serde_json::{Map, Value};

/// Field names upstream responses use for "the list of profiles",
/// probed in order.
const LIST_KEYS: &[&str] = &[
    "esims", "profiles", "sims", "data", "items", "results", "records", "list",
];

/// Status-section keys and the tag their entries carry.
const STATUS_BUCKETS: &[(&str, BucketTag)] = &[
    ("active", BucketTag::Active),
    ("queued", BucketTag::Queued),
    ("pending", BucketTag::Pending),
    ("expired", BucketTag::Expired),
    ("inactive", BucketTag::Inactive),
];

/// The status bucket a record was grouped under, when the upstream grouped
/// by section instead of putting a status field on each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketTag {
    All,
    Active,
    Queued,
    Pending,
    Expired,
    Inactive,
}

impl BucketTag {
    /// The section key this tag came from. Doubles as the status text handed
    /// to classification when the record itself has no status field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketTag::All => "all",
            BucketTag::Active => "active",
            BucketTag::Queued => "queued",
            BucketTag::Pending => "pending",
            BucketTag::Expired => "expired",
            BucketTag::Inactive => "inactive",
        }
    }
}

/// One record out of the flattened payload.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub value: Value,
    pub bucket: Option<BucketTag>,
    /// 1-based position in the flattened output order.
    pub ordinal: usize,
}

/// Flatten an upstream response of unknown shape into raw records.
pub fn flatten_payload(payload: &Value) -> Vec<RawRecord> {
    probe(payload)
        .into_iter()
        .enumerate()
        .map(|(i, (value, bucket))| RawRecord {
            value,
            bucket,
            ordinal: i + 1,
        })
        .collect()
}

fn probe(payload: &Value) -> Vec<(Value, Option<BucketTag>)> {
    // 1. The payload is itself the list.
    if let Value::Array(entries) = payload {
        return untagged(entries);
    }
    let map = match payload {
        Value::Object(map) => map,
        _ => return Vec::new(),
    };

    // 2-4. List keys, then status buckets, at the top level.
    if let Some(found) = probe_object(map) {
        return found;
    }

    // 5. The same probes one level down under a data wrapper.
    if let Some(Value::Object(inner)) = map.get("data") {
        if let Some(found) = probe_object(inner) {
            return found;
        }
    }

    // 6. Last resort: every array-valued property, in key order.
    map.values()
        .filter_map(Value::as_array)
        .flat_map(|entries| entries.iter().cloned().map(|v| (v, None)))
        .collect()
}

/// One object level: first non-empty array under a known list field, then
/// the bucket probe.
fn probe_object(map: &Map<String, Value>) -> Option<Vec<(Value, Option<BucketTag>)>> {
    for key in LIST_KEYS {
        if let Some(Value::Array(entries)) = map.get(*key) {
            if !entries.is_empty() {
                return Some(untagged(entries));
            }
        }
    }
    let bucketed = collect_buckets(map);
    (!bucketed.is_empty()).then_some(bucketed)
}

fn collect_buckets(map: &Map<String, Value>) -> Vec<(Value, Option<BucketTag>)> {
    // An "all" bucket supersedes the per-status sections.
    if let Some(Value::Array(entries)) = map.get("all") {
        if !entries.is_empty() {
            return entries
                .iter()
                .cloned()
                .map(|v| (v, Some(BucketTag::All)))
                .collect();
        }
    }
    let mut out = Vec::new();
    for (key, tag) in STATUS_BUCKETS {
        if let Some(Value::Array(entries)) = map.get(*key) {
            out.extend(entries.iter().cloned().map(|v| (v, Some(*tag))));
        }
    }
    out
}

fn untagged(entries: &[Value]) -> Vec<(Value, Option<BucketTag>)> {
    entries.iter().cloned().map(|v| (v, None)).collect()
}
