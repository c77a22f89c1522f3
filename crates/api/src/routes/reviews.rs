use axum::routing::put;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(reviews::update).delete(reviews::delete))
}
