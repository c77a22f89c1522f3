//! Public freelancer reputation.

use axum::extract::{Path, Query, State};
use axum::Json;
use gigboard_core::error::CoreError;
use gigboard_core::types::DbId;
use gigboard_db::models::review::Review;
use gigboard_db::models::user::FreelancerProfile;
use gigboard_db::repositories::{ProfileRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/freelancers/{id}/profile
pub async fn profile(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<FreelancerProfile>>> {
    let profile = ProfileRepo::find_by_user(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FreelancerProfile",
            id: user_id,
        }))?;
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/freelancers/{id}/reviews
pub async fn reviews(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Review>>>> {
    let reviews =
        ReviewRepo::list_for_freelancer(&state.pool, user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: reviews }))
}
