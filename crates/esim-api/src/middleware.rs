//! Router middleware: permissive CORS and per-request bookkeeping.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::AppState;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Count the request and tag the response with a fresh request id.
pub async fn track(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    state.metrics.http_requests.inc();
    let id = Uuid::new_v4().to_string();
    tracing::debug!(request_id = %id, method = %req.method(), path = %req.uri().path(), "request");
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
