//! Upstream provisioning API access.
//!
//! The profile-list endpoint is bearer-authenticated and returns JSON whose
//! shape is not contractually fixed; this module only moves the payload,
//! shape probing belongs to the ingest pipeline.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use esim_core::EsimError;

/// Source of raw profile payloads.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Fetch the raw profile payload using an opaque bearer credential.
    async fn fetch_profiles(&self, bearer: &str) -> Result<Value, EsimError>;
}

/// reqwest-backed provider against the real provisioning endpoint.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl UpstreamProvider for HttpUpstream {
    async fn fetch_profiles(&self, bearer: &str) -> Result<Value, EsimError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Authorization", format!("Bearer {bearer}"))
            .send()
            .await
            .map_err(|e| EsimError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EsimError::Upstream(format!(
                "HTTP {}",
                resp.status().as_u16()
            )));
        }

        resp.json()
            .await
            .map_err(|e| EsimError::Upstream(e.to_string()))
    }
}

/// Canned provider for tests and offline development: returns a fixed
/// payload, or fails every fetch when built with [`StaticUpstream::failing`].
#[derive(Debug, Clone)]
pub struct StaticUpstream {
    payload: Option<Value>,
}

impl StaticUpstream {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    /// A provider whose every fetch fails, for exercising fallback paths.
    pub fn failing() -> Self {
        Self { payload: None }
    }
}

#[async_trait]
impl UpstreamProvider for StaticUpstream {
    async fn fetch_profiles(&self, _bearer: &str) -> Result<Value, EsimError> {
        match &self.payload {
            Some(payload) => Ok(payload.clone()),
            None => Err(EsimError::Upstream("synthetic failure".to_string())),
        }
    }
}
