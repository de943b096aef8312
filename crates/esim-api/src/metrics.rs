//! Prometheus registry for the api.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

/// Counters and gauges shared across handlers. Cloning shares the
/// underlying atomics.
#[derive(Clone)]
pub struct ApiMetrics {
    pub registry: Registry,
    pub http_requests: IntCounter,
    pub loads: IntCounter,
    pub profiles: IntGauge,
}

impl ApiMetrics {
    pub fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let http_requests =
            IntCounter::new("esim_http_requests_total", "HTTP requests handled")?;
        let loads = IntCounter::new("esim_loads_total", "Profile list loads issued")?;
        let profiles = IntGauge::new("esim_profiles", "Profiles currently in the store")?;
        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(loads.clone()))?;
        registry.register(Box::new(profiles.clone()))?;
        Ok(Self {
            registry,
            http_requests,
            loads,
            profiles,
        })
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
