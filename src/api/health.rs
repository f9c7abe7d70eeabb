//! Liveness and readiness endpoints for process supervisors

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct Liveness {
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct Readiness {
    pub ready: bool,
    /// `"up"` when the catalog store answers a query, else `"down"`
    pub store: &'static str,
}

async fn healthz() -> Json<Liveness> {
    Json(Liveness {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 503 until the catalog store answers, so traffic is held back
async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    if state.db.ping().await {
        (StatusCode::OK, Json(Readiness { ready: true, store: "up" }))
    } else {
        tracing::warn!("Readiness check failed: catalog store unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Readiness { ready: false, store: "down" }),
        )
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
