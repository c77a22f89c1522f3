use axum::routing::{get, post};
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallet`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(wallet::balance))
        .route("/transactions", get(wallet::history))
        .route("/deposit", post(wallet::deposit))
        .route("/withdraw", post(wallet::withdraw))
}
