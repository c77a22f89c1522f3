use axum::routing::{get, post};
use axum::Router;

use crate::handlers::disputes;
use crate::state::AppState;

/// Routes mounted at `/disputes`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(disputes::list_mine))
        .route("/{id}", get(disputes::get_by_id))
        .route("/{id}/messages", post(disputes::post_message))
}
