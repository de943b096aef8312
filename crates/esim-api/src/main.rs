//! Binary entrypoint for the Roamline profile engine api.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use esim_api::config::EsimConfig;
use esim_api::metrics::ApiMetrics;
use esim_api::AppState;
use esim_store::{FileCache, HttpUpstream, PlanCatalog, ProfileStore};

/// Request timeout for upstream fetches.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EsimConfig::from_env();

    let catalog = match &config.plans_path {
        Some(path) => match PlanCatalog::from_yaml_file(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "failed to load plan catalog");
                process::exit(1);
            }
        },
        None => PlanCatalog::builtin(),
    };

    let metrics = match ApiMetrics::build() {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::error!(error = %e, "failed to build metrics registry");
            process::exit(1);
        }
    };

    let client = match reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build upstream client");
            process::exit(1);
        }
    };

    let store = Arc::new(ProfileStore::new(
        Arc::new(HttpUpstream::with_client(
            client,
            config.upstream_url.clone(),
        )),
        Arc::new(FileCache::new(config.cache_path.clone())),
        catalog,
    ));

    // Warm from the cache mirror so a restart serves immediately.
    if let Err(e) = store.load(None).await {
        tracing::warn!(error = %e, "cache warm-up failed");
    }

    let state = AppState { store, metrics };
    if let Err(e) = esim_api::run(&config.addr, state).await {
        tracing::error!(error = %e, "server error");
        process::exit(1);
    }
}
