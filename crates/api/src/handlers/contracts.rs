//! Handlers for contracts and their milestones.
//!
//! Milestone transitions are one endpoint per action so the acting party
//! is obvious from the URL:
//! `submit` (freelancer), `approve`, `request-revision`, `pay` (client).

use axum::extract::{Path, Query, State};
use axum::Json;
use gigboard_core::attachment::Attachment;
use gigboard_core::milestone::{MilestoneAction, MilestoneDraft};
use gigboard_core::types::DbId;
use gigboard_db::models::contract::{ContractView, CreateContract};
use gigboard_db::repositories::ContractRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// Body for `POST /contracts`.
#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub proposal_id: DbId,
    /// Omit for a single milestone covering the whole bid.
    pub milestones: Option<Vec<MilestoneDraft>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitMilestoneRequest {
    #[serde(default)]
    pub deliverables: Vec<Attachment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevisionRequest {
    pub feedback: Option<String>,
}

/// POST /api/v1/contracts
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContractRequest>,
) -> AppResult<Created<ContractView>> {
    let outcome = ContractRepo::create_from_proposal(
        &state.pool,
        input.proposal_id,
        &auth.actor(),
        CreateContract {
            milestones: input.milestones,
        },
    )
    .await?;
    Ok(created(state.deliver(outcome)))
}

/// GET /api/v1/contracts
///
/// Contracts where the caller is either party.
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ContractView>>>> {
    let contracts =
        ContractRepo::list_for_user(&state.pool, auth.user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: contracts }))
}

/// GET /api/v1/contracts/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ContractView>>> {
    let contract = ContractRepo::get(&state.pool, id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: contract }))
}

/// POST /api/v1/contracts/{id}/milestones
pub async fn add_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(draft): Json<MilestoneDraft>,
) -> AppResult<Created<ContractView>> {
    let contract = ContractRepo::add_milestone(&state.pool, id, &auth.actor(), draft).await?;
    Ok(created(contract))
}

/// POST /api/v1/contracts/{id}/milestones/{seq}/submit
///
/// The body is optional; without one the milestone is submitted with no
/// deliverables.
pub async fn submit_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, seq)): Path<(DbId, i32)>,
    input: Option<Json<SubmitMilestoneRequest>>,
) -> AppResult<Json<DataResponse<ContractView>>> {
    let Json(input) = input.unwrap_or_default();
    let action = MilestoneAction::Submit {
        deliverables: input.deliverables,
    };
    transition(auth, state, id, seq, action).await
}

/// POST /api/v1/contracts/{id}/milestones/{seq}/approve
pub async fn approve_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, seq)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<ContractView>>> {
    transition(auth, state, id, seq, MilestoneAction::Approve).await
}

/// POST /api/v1/contracts/{id}/milestones/{seq}/request-revision
pub async fn request_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, seq)): Path<(DbId, i32)>,
    input: Option<Json<RevisionRequest>>,
) -> AppResult<Json<DataResponse<ContractView>>> {
    let Json(input) = input.unwrap_or_default();
    let action = MilestoneAction::RequestRevision {
        feedback: input.feedback,
    };
    transition(auth, state, id, seq, action).await
}

/// POST /api/v1/contracts/{id}/milestones/{seq}/pay
///
/// Credits the freelancer and may complete the contract.
pub async fn pay_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, seq)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<ContractView>>> {
    transition(auth, state, id, seq, MilestoneAction::Pay).await
}

async fn transition(
    auth: AuthUser,
    state: AppState,
    contract_id: DbId,
    seq: i32,
    action: MilestoneAction,
) -> AppResult<Json<DataResponse<ContractView>>> {
    let name = action.name();
    let outcome =
        ContractRepo::transition_milestone(&state.pool, contract_id, seq, &auth.actor(), action)
            .await?;
    tracing::info!(
        contract_id,
        seq,
        action = name,
        user_id = auth.user_id,
        progress = outcome.value.progress,
        "Milestone transitioned"
    );
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}
