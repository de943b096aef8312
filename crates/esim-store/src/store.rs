//! Authoritative profile store.
//!
//! One in-memory list of canonical profiles behind a `tokio` RwLock, with a
//! best-effort cache mirror and an injected upstream. Every mutation is a
//! whole-list change under a single write guard; `load` is the only
//! long-running operation and is cancellable: a fresh load supersedes an
//! outstanding one, whose result is discarded on arrival.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use esim_core::{identity_key_of, EsimError, LifecycleView, Profile, ProfilePatch, ProfileStatus};
use esim_ingest::{dedupe_by_id, ingest_payload};

use crate::cache::ProfileCache;
use crate::plans::PlanCatalog;
use crate::upstream::UpstreamProvider;

/// Read-time view tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    pub active: usize,
    pub queued: usize,
    pub expired: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    profiles: Vec<Profile>,
    loading: bool,
    /// Last load failure, cleared by the next completed load.
    error: Option<String>,
}

pub struct ProfileStore {
    state: RwLock<StoreState>,
    upstream: Arc<dyn UpstreamProvider>,
    cache: Arc<dyn ProfileCache>,
    catalog: PlanCatalog,
    /// Token owned by the load currently in flight.
    load_token: Mutex<CancellationToken>,
}

impl ProfileStore {
    pub fn new(
        upstream: Arc<dyn UpstreamProvider>,
        cache: Arc<dyn ProfileCache>,
        catalog: PlanCatalog,
    ) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            upstream,
            cache,
            catalog,
            load_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Load the profile list.
    ///
    /// With a credential: fetch upstream, run the ingest pipeline, replace
    /// the list wholesale, then mirror a non-empty result to the cache. On
    /// fetch failure the cache stands in, prior state is otherwise kept, and
    /// the failure lands in the error slot; calling again retries. Without
    /// a credential only the cache is consulted.
    ///
    /// Issuing a load cancels any outstanding one; the superseded load's
    /// result is discarded when it arrives and its call returns Ok.
    pub async fn load(&self, credential: Option<&str>) -> Result<(), EsimError> {
        let token = {
            let mut slot = self.load_token.lock().await;
            slot.cancel();
            let fresh = CancellationToken::new();
            *slot = fresh.clone();
            fresh
        };

        {
            // Checked under the same guard every state write takes, so a
            // call superseded before this point cannot re-raise the flag
            // after its superseder already cleared it.
            let mut state = self.state.write().await;
            if token.is_cancelled() {
                return Ok(());
            }
            state.loading = true;
        }

        match credential {
            Some(bearer) => self.load_via_upstream(bearer, &token).await,
            None => {
                self.apply_cache(&token, None).await;
                Ok(())
            }
        }
    }

    async fn load_via_upstream(
        &self,
        bearer: &str,
        token: &CancellationToken,
    ) -> Result<(), EsimError> {
        let fetched = tokio::select! {
            _ = token.cancelled() => return Ok(()),
            fetched = self.upstream.fetch_profiles(bearer) => fetched,
        };

        match fetched {
            Ok(payload) => {
                let profiles = dedupe_by_id(ingest_payload(&payload, Utc::now()));
                {
                    let mut state = self.state.write().await;
                    if token.is_cancelled() {
                        return Ok(());
                    }
                    state.profiles = profiles.clone();
                    state.loading = false;
                    state.error = None;
                }
                info!(count = profiles.len(), "profile list loaded from upstream");
                // A transient empty response must not wipe a good mirror,
                // and a result superseded mid-write must not clobber it.
                if !profiles.is_empty() && !token.is_cancelled() {
                    if let Err(e) = self.cache.write(&profiles).await {
                        warn!(error = %e, "cache mirror write failed");
                    }
                }
                Ok(())
            }
            // A superseded load's failure is as moot as its result.
            Err(_) if token.is_cancelled() => Ok(()),
            Err(e) => {
                warn!(error = %e, "upstream fetch failed, falling back to cache");
                self.apply_cache(token, Some(e.to_string())).await;
                Err(e)
            }
        }
    }

    /// Replace the list from the cache mirror when it has content, keep
    /// prior state otherwise. Clears or sets the error slot per `error`.
    async fn apply_cache(&self, token: &CancellationToken, error: Option<String>) {
        let cached = self.cache.read().await;
        let mut state = self.state.write().await;
        if token.is_cancelled() {
            return;
        }
        if let Some(profiles) = cached {
            debug!(count = profiles.len(), "profile list loaded from cache");
            state.profiles = dedupe_by_id(profiles);
        }
        state.loading = false;
        state.error = error;
    }

    /// Synthesize and append a `Generated` profile for a cataloged plan.
    pub async fn add(&self, country_code: &str, plan_id: u16) -> Result<Profile, EsimError> {
        let plan = self
            .catalog
            .find(plan_id)
            .ok_or_else(|| EsimError::Catalog(format!("no plan with id {plan_id}")))?;

        let identifier = iccid::synthesize(country_code, plan.plan_id);
        let code = iccid::synthesize_activation_code();
        let payload = iccid::activation_payload(&identifier, &code);
        // Same table synthesis draws from, so the embedded prefix and the
        // stored country always agree. Unknown codes land on the generic
        // worldwide entry.
        let entry = iccid::prefix_for_country(country_code);

        let now = Utc::now();
        let profile = Profile {
            iccid: identifier,
            country_code: Some(entry.country_code.to_string()),
            country_name: Some(entry.country_name.to_string()),
            plan_label: Some(plan.label.clone()),
            total_quota: Some(plan.quota.clone()),
            remaining_quota: Some(plan.quota.clone()),
            status: ProfileStatus::Generated,
            created_at: now,
            expires_at: now + Duration::days(plan.duration_days),
            activated_at: None,
            duration_days: Some(plan.duration_days),
            install_url: Some(payload),
            activation_code: Some(code),
            raw: None,
        };

        let mut state = self.state.write().await;
        state.profiles.push(profile.clone());
        info!(iccid = %profile.iccid, plan = plan_id, "profile synthesized");
        Ok(profile)
    }

    /// Apply a partial update to the profile with this identifier.
    pub async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<Profile, EsimError> {
        let key = identity_key_of(id);
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.identity_key() == key)
            .ok_or_else(|| EsimError::Profile(format!("no profile with identifier {id}")))?;
        profile.apply_patch(patch);
        Ok(profile.clone())
    }

    /// Remove the profile with this identifier.
    pub async fn remove(&self, id: &str) -> Result<(), EsimError> {
        let key = identity_key_of(id);
        let mut state = self.state.write().await;
        let before = state.profiles.len();
        state.profiles.retain(|p| p.identity_key() != key);
        if state.profiles.len() == before {
            return Err(EsimError::Profile(format!(
                "no profile with identifier {id}"
            )));
        }
        Ok(())
    }

    /// Force the `Activated` transition, stamping the activation time.
    pub async fn mark_activated(&self, id: &str) -> Result<Profile, EsimError> {
        let key = identity_key_of(id);
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.identity_key() == key)
            .ok_or_else(|| EsimError::Profile(format!("no profile with identifier {id}")))?;
        profile.mark_activated(Utc::now());
        info!(iccid = %profile.iccid, "profile marked activated");
        Ok(profile.clone())
    }

    pub async fn get(&self, id: &str) -> Option<Profile> {
        let key = identity_key_of(id);
        self.state
            .read()
            .await
            .profiles
            .iter()
            .find(|p| p.identity_key() == key)
            .cloned()
    }

    pub async fn profiles(&self) -> Vec<Profile> {
        self.state.read().await.profiles.clone()
    }

    /// Profiles in one presentation bucket, classified at read time.
    pub async fn by_view(&self, view: LifecycleView) -> Vec<Profile> {
        let now = Utc::now();
        self.state
            .read()
            .await
            .profiles
            .iter()
            .filter(|p| p.view_at(now) == view)
            .cloned()
            .collect()
    }

    pub async fn counts(&self) -> ViewCounts {
        let now = Utc::now();
        let state = self.state.read().await;
        let mut counts = ViewCounts {
            active: 0,
            queued: 0,
            expired: 0,
            total: state.profiles.len(),
        };
        for profile in &state.profiles {
            match profile.view_at(now) {
                LifecycleView::Active => counts.active += 1,
                LifecycleView::Queued => counts.queued += 1,
                LifecycleView::Expired => counts.expired += 1,
            }
        }
        counts
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// The catalog this store synthesizes from.
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::upstream::StaticUpstream;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct SlowUpstream {
        delay_ms: u64,
        /// None makes every fetch fail after the delay.
        payload: Option<Value>,
    }

    #[async_trait]
    impl UpstreamProvider for SlowUpstream {
        async fn fetch_profiles(&self, _bearer: &str) -> Result<Value, EsimError> {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            match &self.payload {
                Some(payload) => Ok(payload.clone()),
                None => Err(EsimError::Upstream("synthetic failure".to_string())),
            }
        }
    }

    fn store_with(
        upstream: Arc<dyn UpstreamProvider>,
        cache: Arc<MemoryCache>,
    ) -> ProfileStore {
        ProfileStore::new(upstream, cache, PlanCatalog::builtin())
    }

    fn cached_profile(id: &str) -> Profile {
        let now = Utc::now();
        Profile {
            iccid: id.to_string(),
            country_code: Some("US".to_string()),
            country_name: Some("United States".to_string()),
            plan_label: Some("Cached Plan".to_string()),
            total_quota: Some("5 GB".to_string()),
            remaining_quota: None,
            status: ProfileStatus::Generated,
            created_at: now,
            expires_at: now + Duration::days(30),
            activated_at: None,
            duration_days: Some(30),
            install_url: None,
            activation_code: None,
            raw: None,
        }
    }

    #[tokio::test]
    async fn test_load_applies_upstream_profiles() {
        let payload = json!({
            "active": [{"iccid": "8910100123456780015", "remaining_data": 3200}],
            "queued": [{"iccid": "8944200987654320010"}]
        });
        let cache = Arc::new(MemoryCache::new());
        let store = store_with(Arc::new(StaticUpstream::new(payload)), cache.clone());

        store.load(Some("token")).await.unwrap();

        let profiles = store.profiles().await;
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].status, ProfileStatus::Activated);
        assert!(!store.is_loading().await);
        assert!(store.last_error().await.is_none());
        // Non-empty result mirrors to the cache.
        assert_eq!(cache.read().await.unwrap(), profiles);
    }

    #[tokio::test]
    async fn test_load_empty_payload_is_clean() {
        let cache = Arc::new(MemoryCache::new());
        let store = store_with(Arc::new(StaticUpstream::new(json!({}))), cache.clone());

        store.load(Some("token")).await.unwrap();

        assert!(store.profiles().await.is_empty());
        assert!(!store.is_loading().await);
        assert!(store.last_error().await.is_none());
        // An empty result must not touch the mirror.
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_cache() {
        let cache = Arc::new(MemoryCache::new());
        cache.write(&[cached_profile("8910100123456780015")]).await.unwrap();
        let store = store_with(Arc::new(StaticUpstream::failing()), cache);

        let err = store.load(Some("token")).await.unwrap_err();
        assert!(matches!(err, EsimError::Upstream(_)));

        let profiles = store.profiles().await;
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].plan_label.as_deref(), Some("Cached Plan"));
        assert!(!store.is_loading().await);
        assert!(store.last_error().await.unwrap().starts_with("UPSTREAM/"));
    }

    #[tokio::test]
    async fn test_load_failure_without_cache_keeps_prior_state() {
        let store = store_with(
            Arc::new(StaticUpstream::failing()),
            Arc::new(MemoryCache::new()),
        );
        store.add("US", 2).await.unwrap();

        assert!(store.load(Some("token")).await.is_err());

        assert_eq!(store.profiles().await.len(), 1);
        assert!(store.last_error().await.is_some());
    }

    #[tokio::test]
    async fn test_load_without_credential_skips_upstream() {
        let cache = Arc::new(MemoryCache::new());
        cache.write(&[cached_profile("111")]).await.unwrap();
        // A failing upstream proves the fetch is skipped entirely.
        let store = store_with(Arc::new(StaticUpstream::failing()), cache);

        store.load(None).await.unwrap();

        assert_eq!(store.profiles().await.len(), 1);
        assert!(store.last_error().await.is_none());
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn test_fresh_load_discards_stale_result() {
        let cache = Arc::new(MemoryCache::new());
        cache.write(&[cached_profile("222")]).await.unwrap();
        let slow = SlowUpstream {
            delay_ms: 200,
            payload: Some(json!([{"iccid": "111"}])),
        };
        let store = Arc::new(store_with(Arc::new(slow), cache));

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.load(Some("token")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // Supersede the in-flight load; its result must be discarded.
        store.load(None).await.unwrap();
        first.await.unwrap().unwrap();

        let profiles = store.profiles().await;
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].iccid, "222");
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn test_superseded_failing_load_stays_silent() {
        let cache = Arc::new(MemoryCache::new());
        cache.write(&[cached_profile("222")]).await.unwrap();
        let slow = SlowUpstream {
            delay_ms: 200,
            payload: None,
        };
        let store = Arc::new(store_with(Arc::new(slow), cache));

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.load(Some("token")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        store.load(None).await.unwrap();

        // A superseded load reports success even when its fetch fails,
        // and leaves no error or loading flag behind.
        assert!(first.await.unwrap().is_ok());
        assert!(store.last_error().await.is_none());
        assert!(!store.is_loading().await);
        assert_eq!(store.profiles().await[0].iccid, "222");
    }

    #[tokio::test]
    async fn test_add_synthesizes_complete_profile() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );

        let profile = store.add("US", 2).await.unwrap();

        assert!(iccid::validate(&profile.iccid));
        assert_eq!(profile.status, ProfileStatus::Generated);
        assert_eq!(profile.plan_label.as_deref(), Some("Traveler 5GB"));
        assert_eq!(profile.total_quota.as_deref(), Some("5 GB"));
        assert_eq!(profile.remaining_quota.as_deref(), Some("5 GB"));
        assert_eq!(profile.country_code.as_deref(), Some("US"));
        assert_eq!(profile.country_name.as_deref(), Some("United States"));
        assert_eq!(profile.duration_days, Some(30));

        let code = profile.activation_code.as_deref().unwrap();
        assert!(code.starts_with("RL-"));
        let payload = profile.install_url.as_deref().unwrap();
        assert!(payload.starts_with("LPA:1$rsp.roamline.net$"));
        assert!(payload.ends_with(&iccid::strip(&profile.iccid)));

        assert_eq!(store.profiles().await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_plan_is_a_catalog_error() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );
        let err = store.add("US", 999).await.unwrap_err();
        assert!(err.to_string().starts_with("CATALOG/"));
        assert!(store.profiles().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_patches_named_fields_only() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );
        let added = store.add("US", 2).await.unwrap();

        let patch = ProfilePatch {
            remaining_quota: Some("1.2 GB".to_string()),
            ..Default::default()
        };
        let updated = store.update(&added.iccid, &patch).await.unwrap();

        assert_eq!(updated.remaining_quota.as_deref(), Some("1.2 GB"));
        assert_eq!(updated.plan_label, added.plan_label);
        assert_eq!(updated.status, ProfileStatus::Generated);
    }

    #[tokio::test]
    async fn test_update_unknown_identifier_errors() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );
        let err = store
            .update("8910100123456780015", &ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("PROFILE/"));
    }

    #[tokio::test]
    async fn test_remove_deletes_by_identity() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );
        let added = store.add("US", 1).await.unwrap();

        // Lookup works with display formatting too.
        store.remove(&iccid::format(&added.iccid)).await.unwrap();
        assert!(store.profiles().await.is_empty());

        assert!(store.remove(&added.iccid).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_activated_stamps_and_reclassifies() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );
        let added = store.add("JP", 3).await.unwrap();
        assert_eq!(store.counts().await.queued, 1);

        let activated = store.mark_activated(&added.iccid).await.unwrap();
        assert_eq!(activated.status, ProfileStatus::Activated);
        assert!(activated.activated_at.is_some());

        let counts = store.counts().await;
        assert_eq!(counts.active, 1);
        assert_eq!(counts.queued, 0);
        assert_eq!(counts.total, 1);
    }

    #[tokio::test]
    async fn test_views_classify_at_read_time() {
        let now = Utc::now();
        let payload = json!([
            {"iccid": "111", "status": "active"},
            {"iccid": "222", "status": "pending"},
            {
                "iccid": "333",
                "status": "active",
                "created_at": (now - Duration::days(10)).to_rfc3339(),
                "duration": 7
            }
        ]);
        let store = store_with(
            Arc::new(StaticUpstream::new(payload)),
            Arc::new(MemoryCache::new()),
        );
        store.load(Some("token")).await.unwrap();

        // "333" is stored activated but its window has passed.
        assert_eq!(store.by_view(LifecycleView::Active).await.len(), 1);
        assert_eq!(store.by_view(LifecycleView::Queued).await.len(), 1);
        assert_eq!(store.by_view(LifecycleView::Expired).await.len(), 1);

        let counts = store.counts().await;
        assert_eq!(counts.total, 3);
        assert_eq!(counts.expired, 1);
    }

    #[tokio::test]
    async fn test_get_accepts_formatted_identifier() {
        let store = store_with(
            Arc::new(StaticUpstream::new(json!({}))),
            Arc::new(MemoryCache::new()),
        );
        let added = store.add("FR", 4).await.unwrap();

        let found = store.get(&iccid::format(&added.iccid)).await.unwrap();
        assert_eq!(found.iccid, added.iccid);
        assert!(store.get("0000000000000000000").await.is_none());
    }
}
