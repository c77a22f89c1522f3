pub mod admin;
pub mod contracts;
pub mod disputes;
pub mod freelancers;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod projects;
pub mod proposals;
pub mod reviews;
pub mod users;
pub mod wallet;

use axum::routing::delete;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /users/me                                          current account
///
/// /projects                                          list open, post
/// /projects/mine                                     caller's projects
/// /projects/{id}                                     get, update, delete
/// /projects/{id}/cancel                              cancel (POST)
/// /projects/{id}/proposals                           list (owner), submit
///
/// /proposals/mine                                    caller's proposals
/// /proposals/{id}                                    delete
/// /proposals/{id}/accept|reject|withdraw             transitions (POST)
///
/// /contracts                                         list mine, create
/// /contracts/{id}                                    get
/// /contracts/{id}/milestones                         add
/// /contracts/{id}/milestones/{seq}/submit            freelancer
/// /contracts/{id}/milestones/{seq}/approve           client
/// /contracts/{id}/milestones/{seq}/request-revision  client
/// /contracts/{id}/milestones/{seq}/pay               client
/// /contracts/{id}/disputes                           open
/// /contracts/{id}/reviews                            submit
///
/// /disputes                                          caller's disputes
/// /disputes/{id}                                     thread
/// /disputes/{id}/messages                            post
///
/// /wallet                                            balance
/// /wallet/transactions                               history
/// /wallet/deposit, /wallet/withdraw                  (POST)
///
/// /reviews/{id}                                      update, delete
/// /freelancers/{id}/profile|reviews                  reputation
///
/// /jobs                                              list open, post
/// /jobs/{id}                                         get
/// /jobs/{id}/close                                   close (POST)
/// /jobs/{id}/applications                            list (owner), apply
/// /applications/{id}                                 withdraw (DELETE)
///
/// /notifications                                     list
/// /notifications/read-all                            (POST)
/// /notifications/unread-count                        count
/// /notifications/{id}/read                           (POST)
///
/// /admin/users                                       provision (admin only)
/// /admin/disputes                                    queue (admin only)
/// /admin/disputes/{id}/review|resolve                (POST, admin only)
/// /admin/withdrawals/{id}/settle                     (POST, admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .nest("/proposals", proposals::router())
        .nest("/contracts", contracts::router())
        .nest("/disputes", disputes::router())
        .nest("/wallet", wallet::router())
        .nest("/reviews", reviews::router())
        .nest("/freelancers", freelancers::router())
        .nest("/jobs", jobs::router())
        .route(
            "/applications/{id}",
            delete(handlers::jobs::withdraw_application),
        )
        .nest("/notifications", notifications::router())
        .nest("/admin", admin::router())
}
