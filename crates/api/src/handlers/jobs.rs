//! Handlers for the job board.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gigboard_core::error::CoreError;
use gigboard_core::types::DbId;
use gigboard_db::models::job::{ApplyToJob, CreateJob, Job, JobApplication};
use gigboard_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateJob>,
) -> AppResult<Created<Job>> {
    let job = JobRepo::create(&state.pool, &auth.actor(), &input).await?;
    Ok(created(job))
}

/// GET /api/v1/jobs
pub async fn list_open(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Job>>>> {
    let jobs = JobRepo::list_open(&state.pool, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = JobRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/close
pub async fn close(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = JobRepo::close(&state.pool, id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/applications
pub async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<ApplyToJob>,
) -> AppResult<Created<JobApplication>> {
    let outcome = JobRepo::apply(&state.pool, job_id, &auth.actor(), &input).await?;
    Ok(created(state.deliver(outcome)))
}

/// GET /api/v1/jobs/{id}/applications
///
/// Job owner or administrator only.
pub async fn list_applications(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<JobApplication>>>> {
    let applications = JobRepo::list_applications(&state.pool, job_id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: applications }))
}

/// DELETE /api/v1/applications/{id}
pub async fn withdraw_application(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    JobRepo::withdraw_application(&state.pool, id, &auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
