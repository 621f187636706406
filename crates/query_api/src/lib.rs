//! # Query API
//!
//! Read-only HTTP surface over the Storage Gateway.
//!
//! Endpoints:
//! - `GET /api/location/latest` - most recent report, 404 when none
//! - `GET /api/location/all?limit=N` - up to N reports, id descending
//! - `GET /api/health` - liveness, never touches storage
//!
//! Query failures surface as explicit status codes, never as faults: 503
//! whenever the gateway has no usable pool or a fetch fails.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use contracts::ReportStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Absent in degraded mode; every storage-backed endpoint then returns 503.
    pub store: Option<Arc<dyn ReportStore>>,
    /// `limit` applied when the caller does not supply one
    pub default_limit: i64,
    /// Server-side cap on caller-supplied `limit`
    pub max_limit: i64,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: i64,
}

/// Query parameters for the recent-reports endpoint.
#[derive(Debug, Deserialize)]
struct RecentParams {
    limit: Option<i64>,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/location/latest", get(latest_handler))
        .route("/api/location/all", get(recent_handler))
        .route("/api/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Latest report, or 404 when the table is empty.
async fn latest_handler(State(state): State<AppState>) -> Response {
    let Some(store) = state.store.as_ref() else {
        return service_unavailable("storage not configured");
    };

    match store.fetch_latest().await {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "no location data available" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "latest query failed");
            service_unavailable(&e.to_string())
        }
    }
}

/// Up to `limit` reports, id descending. The limit is clamped server-side.
async fn recent_handler(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Response {
    let Some(store) = state.store.as_ref() else {
        return service_unavailable("storage not configured");
    };

    let limit = params
        .limit
        .unwrap_or(state.default_limit)
        .clamp(1, state.max_limit);

    match store.fetch_recent(limit).await {
        Ok(reports) => Json(reports).into_response(),
        Err(e) => {
            error!(error = %e, limit, "recent query failed");
            service_unavailable(&e.to_string())
        }
    }
}

/// Liveness probe; succeeds as long as the process is running.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

fn service_unavailable(detail: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "detail": detail })),
    )
        .into_response()
}
