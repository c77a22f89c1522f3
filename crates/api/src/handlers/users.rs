//! Account lookup and administrator provisioning.

use axum::extract::State;
use axum::Json;
use gigboard_core::error::CoreError;
use gigboard_db::models::user::{CreateUser, User};
use gigboard_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user }))
}

/// POST /api/v1/admin/users
///
/// Creates the account row (and freelancer profile) for an identity issued
/// by the external provider.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<Created<User>> {
    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, role = %user.role, admin_id = admin.user_id, "User provisioned");
    Ok(created(user))
}
