//! Handlers for disputes and their message threads.

use axum::extract::{Path, Query, State};
use axum::Json;
use gigboard_core::status::DisputeStatus;
use gigboard_core::types::DbId;
use gigboard_db::models::dispute::{
    Dispute, DisputeMessage, DisputeThread, OpenDispute, PostMessage, ResolveDispute,
};
use gigboard_db::repositories::DisputeRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// Query parameters for the administrator queue.
#[derive(Debug, Deserialize)]
pub struct DisputeQueueParams {
    /// Omit to list every status.
    pub status: Option<DisputeStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/contracts/{id}/disputes
///
/// Freezes the contract until an administrator resolves the dispute.
pub async fn open(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
    Json(input): Json<OpenDispute>,
) -> AppResult<Created<Dispute>> {
    let outcome = DisputeRepo::open(&state.pool, contract_id, &auth.actor(), &input).await?;
    tracing::info!(
        dispute_id = outcome.value.id,
        contract_id,
        initiator_id = auth.user_id,
        "Dispute opened"
    );
    Ok(created(state.deliver(outcome)))
}

/// GET /api/v1/disputes
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Dispute>>>> {
    let disputes =
        DisputeRepo::list_for_user(&state.pool, auth.user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: disputes }))
}

/// GET /api/v1/disputes/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DisputeThread>>> {
    let thread = DisputeRepo::get(&state.pool, id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: thread }))
}

/// POST /api/v1/disputes/{id}/messages
pub async fn post_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PostMessage>,
) -> AppResult<Created<DisputeMessage>> {
    let outcome = DisputeRepo::add_message(&state.pool, id, &auth.actor(), &input).await?;
    Ok(created(state.deliver(outcome)))
}

/// GET /api/v1/admin/disputes
pub async fn list_queue(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<DisputeQueueParams>,
) -> AppResult<Json<DataResponse<Vec<Dispute>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let disputes =
        DisputeRepo::list_by_status(&state.pool, params.status, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: disputes }))
}

/// POST /api/v1/admin/disputes/{id}/review
pub async fn mark_under_review(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Dispute>>> {
    let outcome = DisputeRepo::mark_under_review(&state.pool, id, &admin.actor()).await?;
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}

/// POST /api/v1/admin/disputes/{id}/resolve
pub async fn resolve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResolveDispute>,
) -> AppResult<Json<DataResponse<Dispute>>> {
    let outcome = DisputeRepo::resolve(&state.pool, id, &admin.actor(), &input).await?;
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}
