//! Liveness probe, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    /// `ok`, or `degraded` when the database cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether anything is consuming notices from the event bus.
    pub notifications_attached: bool,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let db_healthy = gigboard_db::health_check(&state.pool).await.is_ok();
    Json(Health {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        notifications_attached: state.event_bus.subscriber_count() > 0,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
