use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::proposals;
use crate::state::AppState;

/// Routes mounted at `/proposals`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(proposals::list_mine))
        .route("/{id}", delete(proposals::delete))
        .route("/{id}/accept", post(proposals::accept))
        .route("/{id}/reject", post(proposals::reject))
        .route("/{id}/withdraw", post(proposals::withdraw))
}
