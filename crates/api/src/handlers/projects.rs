//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gigboard_core::types::DbId;
use gigboard_db::models::project::{CreateProject, Project, UpdateProject};
use gigboard_db::repositories::ProjectRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<Created<Project>> {
    let project = ProjectRepo::create(&state.pool, &auth.actor(), &input).await?;
    tracing::info!(project_id = project.id, client_id = auth.user_id, "Project posted");
    Ok(created(project))
}

/// GET /api/v1/projects
///
/// Open projects, newest first.
pub async fn list_open(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list_open(&state.pool, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/mine
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects =
        ProjectRepo::list_for_client(&state.pool, auth.user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::get(&state.pool, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::update(&state.pool, id, &auth.actor(), &input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/cancel
pub async fn cancel(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let outcome = ProjectRepo::cancel(&state.pool, id, &auth.actor()).await?;
    tracing::info!(project_id = id, client_id = auth.user_id, "Project cancelled");
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ProjectRepo::delete(&state.pool, id, &auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
