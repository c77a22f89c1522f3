//! Handlers for proposals (bids on projects).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gigboard_core::types::DbId;
use gigboard_db::models::proposal::{CreateProposal, Proposal};
use gigboard_db::repositories::ProposalRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// POST /api/v1/projects/{id}/proposals
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateProposal>,
) -> AppResult<Created<Proposal>> {
    let outcome = ProposalRepo::submit(&state.pool, project_id, &auth.actor(), &input).await?;
    tracing::info!(
        project_id,
        proposal_id = outcome.value.id,
        freelancer_id = auth.user_id,
        "Proposal submitted"
    );
    Ok(created(state.deliver(outcome)))
}

/// GET /api/v1/projects/{id}/proposals
///
/// Project owner or administrator only.
pub async fn list_for_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Proposal>>>> {
    let proposals = ProposalRepo::list_for_project(
        &state.pool,
        project_id,
        &auth.actor(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/mine
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Proposal>>>> {
    let proposals =
        ProposalRepo::list_for_freelancer(&state.pool, auth.user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// POST /api/v1/proposals/{id}/accept
///
/// Rejects every other pending proposal and assigns the freelancer.
pub async fn accept(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let outcome = ProposalRepo::accept(&state.pool, id, &auth.actor()).await?;
    tracing::info!(
        proposal_id = id,
        project_id = outcome.value.project_id,
        client_id = auth.user_id,
        "Proposal accepted"
    );
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}

/// POST /api/v1/proposals/{id}/reject
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let outcome = ProposalRepo::reject(&state.pool, id, &auth.actor()).await?;
    tracing::info!(proposal_id = id, client_id = auth.user_id, "Proposal rejected");
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}

/// POST /api/v1/proposals/{id}/withdraw
pub async fn withdraw(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let proposal = ProposalRepo::withdraw(&state.pool, id, &auth.actor()).await?;
    tracing::info!(proposal_id = id, freelancer_id = auth.user_id, "Proposal withdrawn");
    Ok(Json(DataResponse { data: proposal }))
}

/// DELETE /api/v1/proposals/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ProposalRepo::delete(&state.pool, id, &auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
