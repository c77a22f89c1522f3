use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_open).post(jobs::create))
        .route("/{id}", get(jobs::get_by_id))
        .route("/{id}/close", post(jobs::close))
        .route(
            "/{id}/applications",
            get(jobs::list_applications).post(jobs::apply),
        )
}
