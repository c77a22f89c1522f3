//! Administrator-only routes. Every handler takes `RequireAdmin`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{disputes, users, wallet};
use crate::state::AppState;

/// Routes mounted at `/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create))
        .route("/disputes", get(disputes::list_queue))
        .route("/disputes/{id}/review", post(disputes::mark_under_review))
        .route("/disputes/{id}/resolve", post(disputes::resolve))
        .route("/withdrawals/{id}/settle", post(wallet::settle))
}
