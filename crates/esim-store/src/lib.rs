//! Lifecycle store: the authoritative profile list and its collaborators.
//!
//! [`ProfileStore`] owns the canonical in-memory list and is the only place
//! profiles are mutated. It pulls from an [`UpstreamProvider`], runs the
//! ingest pipeline over whatever shape comes back, and mirrors good results
//! to a [`ProfileCache`] so a cold start or an upstream outage still serves
//! the last known list. Plan metadata for synthesized profiles comes from a
//! [`PlanCatalog`].
//!
//! ```ignore
//! let store = ProfileStore::new(
//!     Arc::new(HttpUpstream::new("https://upstream.example/v2/esims")),
//!     Arc::new(FileCache::new("/var/lib/roamline/profiles.json")),
//!     PlanCatalog::builtin(),
//! );
//! store.load(Some(bearer)).await?;
//! let active = store.by_view(LifecycleView::Active).await;
//! ```

pub mod cache;
pub mod plans;
pub mod store;
pub mod upstream;

pub use cache::{FileCache, MemoryCache, ProfileCache};
pub use plans::{PlanCatalog, PlanDef};
pub use store::{ProfileStore, ViewCounts};
pub use upstream::{HttpUpstream, StaticUpstream, UpstreamProvider};
