//! Cache mirror for the canonical profile list.
//!
//! A single slot holding the last good list, read on cold start or when the
//! upstream is unreachable. Reads never fail the caller: a missing, torn,
//! or tampered slot reads as "no cache" and the store carries on without it.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use esim_core::{EsimError, Profile};

/// Single-slot mirror of the canonical profile list.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Read the mirrored list, or None when no usable cache exists.
    async fn read(&self) -> Option<Vec<Profile>>;

    /// Replace the mirrored list.
    async fn write(&self, profiles: &[Profile]) -> Result<(), EsimError>;
}

/// In-memory slot, the default for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: Mutex<Option<Vec<Profile>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileCache for MemoryCache {
    async fn read(&self) -> Option<Vec<Profile>> {
        self.slot.lock().await.clone()
    }

    async fn write(&self, profiles: &[Profile]) -> Result<(), EsimError> {
        *self.slot.lock().await = Some(profiles.to_vec());
        Ok(())
    }
}

/// On-disk envelope: the list plus a hash over its canonical JSON, so a
/// hand-edited or torn file is detectable.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    checksum: String,
    profiles: Vec<Profile>,
}

/// File-backed slot. Writes go through a temp file and rename so readers
/// never observe a half-written envelope.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn checksum(canonical_json: &str) -> String {
        blake3::hash(canonical_json.as_bytes()).to_hex().to_string()
    }
}

#[async_trait]
impl ProfileCache for FileCache {
    async fn read(&self) -> Option<Vec<Profile>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read cache file");
                return None;
            }
        };
        let envelope: CacheEnvelope = match serde_json::from_slice(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupted cache file, ignoring");
                return None;
            }
        };
        let canonical = serde_json::to_string(&envelope.profiles).ok()?;
        if Self::checksum(&canonical) != envelope.checksum {
            warn!(path = %self.path.display(), "cache checksum mismatch, ignoring");
            return None;
        }
        debug!(path = %self.path.display(), count = envelope.profiles.len(), "cache loaded");
        Some(envelope.profiles)
    }

    async fn write(&self, profiles: &[Profile]) -> Result<(), EsimError> {
        let canonical = serde_json::to_string(profiles)?;
        let envelope = CacheEnvelope {
            checksum: Self::checksum(&canonical),
            profiles: profiles.to_vec(),
        };
        let data = serde_json::to_string_pretty(&envelope)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| EsimError::Cache(format!("create cache dir: {e}")))?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, data.as_bytes())
            .await
            .map_err(|e| EsimError::Cache(format!("write tmp cache: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| EsimError::Cache(format!("rename cache file: {e}")))?;

        debug!(path = %self.path.display(), count = profiles.len(), "cache written");
        Ok(())
    }
}
