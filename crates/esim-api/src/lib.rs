//! Roamline profile engine api: the /v1 REST surface over the lifecycle
//! store. Handlers stay thin; everything stateful lives in
//! [`esim_store::ProfileStore`].

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use esim_core::EsimError;
use esim_store::ProfileStore;

use crate::metrics::ApiMetrics;

/// Shared state for api handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProfileStore>,
    pub metrics: ApiMetrics,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/metrics", get(handlers::metrics_text))
        .route("/v1/plans", get(handlers::list_plans))
        .route(
            "/v1/profiles",
            get(handlers::list_profiles).post(handlers::add_profile),
        )
        .route(
            "/v1/profiles/:iccid",
            get(handlers::get_profile)
                .patch(handlers::update_profile)
                .delete(handlers::delete_profile),
        )
        .route(
            "/v1/profiles/:iccid/activate",
            post(handlers::activate_profile),
        )
        .route(
            "/v1/profiles/:iccid/payload",
            get(handlers::profile_payload),
        )
        .route("/v1/refresh", post(handlers::refresh))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> Result<(), EsimError> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("profile engine api listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
