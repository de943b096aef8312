//! Deduplication and merge.
//!
//! Overlapping upstream buckets routinely deliver the same identifier more
//! than once (an entry in `active` and a stale twin in `queued`). The merge
//! keeps exactly one profile per identifier in first-seen order, chooses the
//! better copy by status rank and field completeness, and backfills whatever
//! display fields the winner is missing from the loser.

use std::collections::{HashMap, HashSet};

use esim_core::Profile;

/// Collapse duplicates into one profile per identifier, first-seen order.
pub fn merge_profiles(profiles: Vec<Profile>) -> Vec<Profile> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Profile> = Vec::with_capacity(profiles.len());

    for incoming in profiles {
        let key = incoming.identity_key();
        match index.get(&key) {
            None => {
                index.insert(key, merged.len());
                merged.push(incoming);
            }
            Some(&at) => {
                let existing = &mut merged[at];
                if replaces(existing, &incoming) {
                    let loser = std::mem::replace(existing, incoming);
                    existing.backfill_from(&loser);
                } else {
                    existing.backfill_from(&incoming);
                }
            }
        }
    }
    merged
}

/// The incoming copy wins only when it is strictly better: higher status
/// rank, or it carries a remaining quota or country the existing copy lacks.
/// Ties keep the existing copy.
fn replaces(existing: &Profile, incoming: &Profile) -> bool {
    if incoming.status.priority() > existing.status.priority() {
        return true;
    }
    if existing.remaining_quota.is_none() && incoming.remaining_quota.is_some() {
        return true;
    }
    let existing_has_country = existing.country_code.is_some() || existing.country_name.is_some();
    let incoming_has_country = incoming.country_code.is_some() || incoming.country_name.is_some();
    !existing_has_country && incoming_has_country
}

/// Identifier-only dedupe: first occurrence wins, no field backfill.
/// Applied at the store boundary in case the input was already merged.
pub fn dedupe_by_id(profiles: Vec<Profile>) -> Vec<Profile> {
    let mut seen: HashSet<String> = HashSet::new();
    profiles
        .into_iter()
        .filter(|p| seen.insert(p.identity_key()))
        .collect()
}
