//! Handlers for client reviews of freelancers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gigboard_core::types::DbId;
use gigboard_db::models::review::{CreateReview, Review, UpdateReview};
use gigboard_db::repositories::ReviewRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// POST /api/v1/contracts/{id}/reviews
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
    Json(input): Json<CreateReview>,
) -> AppResult<Created<Review>> {
    let outcome = ReviewRepo::submit(&state.pool, contract_id, &auth.actor(), &input).await?;
    tracing::info!(
        review_id = outcome.value.id,
        contract_id,
        freelancer_id = outcome.value.freelancer_id,
        rating = input.rating,
        "Review submitted"
    );
    Ok(created(state.deliver(outcome)))
}

/// PUT /api/v1/reviews/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<DataResponse<Review>>> {
    let review = ReviewRepo::update(&state.pool, id, &auth.actor(), &input).await?;
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ReviewRepo::delete(&state.pool, id, &auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
