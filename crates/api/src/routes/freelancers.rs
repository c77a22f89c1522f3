use axum::routing::get;
use axum::Router;

use crate::handlers::freelancers;
use crate::state::AppState;

/// Routes mounted at `/freelancers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/profile", get(freelancers::profile))
        .route("/{id}/reviews", get(freelancers::reviews))
}
