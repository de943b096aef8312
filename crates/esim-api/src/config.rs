//! Environment configuration for the api binary.

use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:8787";
const DEFAULT_UPSTREAM: &str = "https://api.roamline.net/v2/esims";
const DEFAULT_CACHE: &str = "roamline-cache.json";

#[derive(Debug, Clone)]
pub struct EsimConfig {
    /// Listen address, `ESIM_ADDR`.
    pub addr: String,
    /// Upstream provisioning endpoint, `ESIM_UPSTREAM_URL`.
    pub upstream_url: String,
    /// Cache mirror location, `ESIM_CACHE_PATH`.
    pub cache_path: PathBuf,
    /// Plan catalog file, `ESIM_PLANS_PATH`; builtin catalog when unset.
    pub plans_path: Option<PathBuf>,
}

impl EsimConfig {
    pub fn from_env() -> Self {
        Self {
            addr: env_or("ESIM_ADDR", DEFAULT_ADDR),
            upstream_url: env_or("ESIM_UPSTREAM_URL", DEFAULT_UPSTREAM),
            cache_path: PathBuf::from(env_or("ESIM_CACHE_PATH", DEFAULT_CACHE)),
            plans_path: std::env::var("ESIM_PLANS_PATH").ok().map(PathBuf::from),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
