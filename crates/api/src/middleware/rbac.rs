use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gigboard_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated administrator. Anyone else gets 403.
///
/// Used on the `/admin` routes: dispute arbitration, withdrawal settlement
/// and account provisioning.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.actor().is_admin() {
            return Err(CoreError::forbidden("Administrator role required").into());
        }
        Ok(RequireAdmin(user))
    }
}
