//! API handlers.
//!
//! Thin translations between HTTP and the store: query/body shapes in,
//! canonical profiles out. Bearer tokens pass through to the store
//! untouched; a request without one still works, it just cannot reach the
//! upstream.

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use esim_core::{EsimError, LifecycleView, ProfilePatch, ENGINE_VERSION};
use esim_store::PlanDef;

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub view: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlansQuery {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub country_code: String,
    pub plan_id: u16,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let counts = state.store.counts().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": ENGINE_VERSION,
            "loading": state.store.is_loading().await,
            "profiles": counts.total,
            "last_error": state.store.last_error().await,
        })),
    )
}

pub async fn metrics_text(State(state): State<AppState>) -> Response {
    let counts = state.store.counts().await;
    state.metrics.profiles.set(counts.total as i64);
    match metrics::encode(&state.metrics.registry) {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn list_plans(
    State(state): State<AppState>,
    Query(q): Query<PlansQuery>,
) -> (StatusCode, Json<Value>) {
    let catalog = state.store.catalog();
    let plans: Vec<&PlanDef> = match q.country.as_deref() {
        Some(country) => catalog.for_country(country),
        None => catalog.plans().iter().collect(),
    };
    (StatusCode::OK, Json(json!({ "plans": plans })))
}

/// List profiles, optionally narrowed to one lifecycle view. An unknown or
/// `all` view falls back to the whole list.
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = q.view.as_deref().and_then(LifecycleView::parse);
    let profiles = match view {
        Some(v) => state.store.by_view(v).await,
        None => state.store.profiles().await,
    };
    let counts = state.store.counts().await;
    (
        StatusCode::OK,
        Json(json!({ "profiles": profiles, "counts": counts })),
    )
        .into_response()
}

pub async fn add_profile(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Response {
    match state.store.add(&req.country_code, req.plan_id).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

pub async fn get_profile(State(state): State<AppState>, Path(iccid): Path<String>) -> Response {
    match state.store.get(&iccid).await {
        Some(profile) => (StatusCode::OK, Json(profile)).into_response(),
        None => missing(&iccid).into_response(),
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
    Json(patch): Json<ProfilePatch>,
) -> Response {
    match state.store.update(&iccid, &patch).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Response {
    match state.store.remove(&iccid).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

pub async fn activate_profile(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Response {
    match state.store.mark_activated(&iccid).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// The scannable activation payload for one profile: the stored install
/// URL when the upstream gave one, otherwise synthesized from the
/// activation code.
pub async fn profile_payload(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Response {
    let profile = match state.store.get(&iccid).await {
        Some(profile) => profile,
        None => return missing(&iccid).into_response(),
    };
    let payload = profile.install_url.clone().or_else(|| {
        profile
            .activation_code
            .as_deref()
            .map(|code| iccid::activation_payload(&profile.iccid, code))
    });
    match payload {
        Some(payload) => (
            StatusCode::OK,
            Json(json!({
                "iccid": profile.iccid,
                "formatted": iccid::format(&profile.iccid),
                "payload": payload,
            })),
        )
            .into_response(),
        None => error_response(&EsimError::Payload(format!(
            "no activation payload for {iccid}"
        )))
        .into_response(),
    }
}

/// Re-run the load with the request's bearer token; without one only the
/// cache mirror is consulted.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let bearer = bearer_token(&headers);
    state.metrics.loads.inc();
    let result = state.store.load(bearer.as_deref()).await;
    let counts = state.store.counts().await;
    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true, "profiles": counts.total }))),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.to_string(), "profiles": counts.total })),
        ),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn missing(id: &str) -> (StatusCode, Json<Value>) {
    error_response(&EsimError::Profile(format!("no profile with identifier {id}")))
}

fn error_response(err: &EsimError) -> (StatusCode, Json<Value>) {
    (error_status(err), Json(json!({ "error": err.to_string() })))
}

fn error_status(err: &EsimError) -> StatusCode {
    match err {
        EsimError::Profile(_) | EsimError::Payload(_) => StatusCode::NOT_FOUND,
        EsimError::Catalog(_) => StatusCode::BAD_REQUEST,
        EsimError::Upstream(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
