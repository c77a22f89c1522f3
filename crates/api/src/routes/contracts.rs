use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{contracts, disputes, reviews};
use crate::state::AppState;

/// Routes mounted at `/contracts`.
///
/// ```text
/// GET    /                                       -> list_mine
/// POST   /                                       -> create
/// GET    /{id}                                   -> get_by_id
/// POST   /{id}/milestones                        -> add_milestone
/// POST   /{id}/milestones/{seq}/submit           -> submit_milestone
/// POST   /{id}/milestones/{seq}/approve          -> approve_milestone
/// POST   /{id}/milestones/{seq}/request-revision -> request_revision
/// POST   /{id}/milestones/{seq}/pay              -> pay_milestone
/// POST   /{id}/disputes                          -> disputes::open
/// POST   /{id}/reviews                           -> reviews::submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contracts::list_mine).post(contracts::create))
        .route("/{id}", get(contracts::get_by_id))
        .route("/{id}/milestones", post(contracts::add_milestone))
        .route(
            "/{id}/milestones/{seq}/submit",
            post(contracts::submit_milestone),
        )
        .route(
            "/{id}/milestones/{seq}/approve",
            post(contracts::approve_milestone),
        )
        .route(
            "/{id}/milestones/{seq}/request-revision",
            post(contracts::request_revision),
        )
        .route("/{id}/milestones/{seq}/pay", post(contracts::pay_milestone))
        .route("/{id}/disputes", post(disputes::open))
        .route("/{id}/reviews", post(reviews::submit))
}
