use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{projects, proposals};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                   -> list_open
/// POST   /                   -> create
/// GET    /mine               -> list_mine
/// GET    /{id}               -> get_by_id
/// PUT    /{id}               -> update
/// DELETE /{id}               -> delete
/// POST   /{id}/cancel        -> cancel
/// GET    /{id}/proposals     -> proposals::list_for_project
/// POST   /{id}/proposals     -> proposals::submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_open).post(projects::create))
        .route("/mine", get(projects::list_mine))
        .route(
            "/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/{id}/cancel", post(projects::cancel))
        .route(
            "/{id}/proposals",
            get(proposals::list_for_project).post(proposals::submit),
        )
}
