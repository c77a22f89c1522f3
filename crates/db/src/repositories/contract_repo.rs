//! Repository for the `contracts` table: creation from an accepted
//! proposal, milestone transitions, and the completion cascade.

use chrono::Utc;
use gigboard_core::contract::{check_create, ensure_can_view, initial_milestones, Engagement};
use gigboard_core::error::CoreError;
use gigboard_core::milestone::{MilestoneAction, MilestoneDraft};
use gigboard_core::notice::{contract_link, Notice, NoticeKind};
use gigboard_core::roles::Actor;
use gigboard_core::status::{ContractStatus, ProjectStatus};
use gigboard_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::error::{conflict_on_unique, DbError};
use crate::models::contract::{Contract, ContractView, CreateContract};
use crate::repositories::{ProfileRepo, ProjectRepo, ProposalRepo, WalletRepo};
use crate::Outcome;

const COLUMNS: &str = "id, project_id, proposal_id, client_id, freelancer_id, title, \
                       total_amount, status_id, milestones, start_date, end_date, \
                       created_at, updated_at";

pub struct ContractRepo;

impl ContractRepo {
    /// Create the contract for an ACCEPTED proposal. `total_amount` is the
    /// bid and never changes afterwards.
    pub async fn create_from_proposal(
        pool: &PgPool,
        proposal_id: DbId,
        actor: &Actor,
        input: CreateContract,
    ) -> Result<Outcome<ContractView>, DbError> {
        let mut tx = pool.begin().await?;
        let (project, proposal) = ProposalRepo::lock_with_project(&mut tx, proposal_id).await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM contracts WHERE proposal_id = $1)")
                .bind(proposal_id)
                .fetch_one(&mut *tx)
                .await?;
        check_create(proposal.status()?, project.client_id, actor, exists)?;
        let milestones = initial_milestones(input.milestones, proposal.bid_amount, None)?;

        let query = format!(
            "INSERT INTO contracts \
                 (project_id, proposal_id, client_id, freelancer_id, title, total_amount, \
                  status_id, milestones) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&query)
            .bind(project.id)
            .bind(proposal_id)
            .bind(project.client_id)
            .bind(proposal.freelancer_id)
            .bind(&project.title)
            .bind(proposal.bid_amount)
            .bind(ContractStatus::Active.id())
            .bind(Json(&milestones))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "A contract already exists for this proposal"))?;
        tx.commit().await?;

        tracing::info!(
            contract_id = contract.id,
            proposal_id,
            milestones = milestones.len(),
            "Contract created"
        );
        let notice = Notice::new(
            contract.freelancer_id,
            NoticeKind::ContractCreated,
            "Contract started",
            format!("A contract for '{}' has been created", contract.title),
            contract_link(contract.id),
        );
        Ok(Outcome::new(contract.into(), vec![notice]))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1");
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A contract with its progress. Parties and administrators only.
    pub async fn get(pool: &PgPool, id: DbId, actor: &Actor) -> Result<ContractView, DbError> {
        let contract = Self::find_by_id(pool, id)
            .await?
            .ok_or(CoreError::not_found("Contract", id))?;
        ensure_can_view(contract.client_id, contract.freelancer_id, actor)?;
        Ok(contract.into())
    }

    /// Contracts where the user is either party, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContractView>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts \
             WHERE client_id = $1 OR freelancer_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Contract>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(ContractView::from).collect())
    }

    /// Apply one milestone transition and everything it implies.
    ///
    /// PAID credits the freelancer (ledger row, balance, `total_earnings`).
    /// If the transition completes the contract, the project becomes
    /// COMPLETED and the freelancer's `completed_projects` grows by one.
    pub async fn transition_milestone(
        pool: &PgPool,
        contract_id: DbId,
        seq: i32,
        actor: &Actor,
        action: MilestoneAction,
    ) -> Result<Outcome<ContractView>, DbError> {
        let mut tx = pool.begin().await?;
        let (_, contract) = Self::lock_with_project(&mut tx, contract_id).await?;
        let mut engagement = contract.engagement()?;
        let action_name = action.name();
        let result = engagement.apply(seq, actor, action, Utc::now())?;

        let updated = Self::write_back(&mut tx, &engagement).await?;
        if let Some(amount) = result.earned {
            let description = format!(
                "Payment for milestone '{}' on '{}'",
                result.milestone.title, engagement.title
            );
            WalletRepo::record_earning(
                &mut tx,
                engagement.freelancer_id,
                amount,
                engagement.id,
                engagement.project_id,
                contract.proposal_id,
                &description,
            )
            .await?;
            ProfileRepo::add_earnings(&mut tx, engagement.freelancer_id, amount).await?;
        }
        if result.completed {
            Self::apply_completion(&mut tx, &engagement).await?;
        }
        tx.commit().await?;

        tracing::info!(
            contract_id,
            seq,
            action = action_name,
            milestone_status = %result.milestone.status,
            completed = result.completed,
            "Milestone transition applied"
        );
        Ok(Outcome::new(updated.into(), result.notices))
    }

    /// Append a milestone to an ACTIVE contract. Client only.
    pub async fn add_milestone(
        pool: &PgPool,
        contract_id: DbId,
        actor: &Actor,
        draft: MilestoneDraft,
    ) -> Result<ContractView, DbError> {
        let mut tx = pool.begin().await?;
        let contract = Self::lock(&mut tx, contract_id).await?;
        let mut engagement = contract.engagement()?;
        let added = engagement.add_milestone(actor, draft)?;
        let updated = Self::write_back(&mut tx, &engagement).await?;
        tx.commit().await?;

        tracing::info!(contract_id, seq = added.seq, amount = added.amount, "Milestone added");
        Ok(updated.into())
    }

    /// Lock the contract row. Callers that may also touch the project must
    /// use [`Self::lock_with_project`] instead to keep the lock order.
    pub(crate) async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Contract, DbError> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::not_found("Contract", id).into())
    }

    /// Lock the originating project, then the contract.
    pub(crate) async fn lock_with_project(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<(DbId, Contract), DbError> {
        let project_id: DbId = sqlx::query_scalar("SELECT project_id FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(CoreError::not_found("Contract", id))?;
        ProjectRepo::lock(conn, project_id).await?;
        let contract = Self::lock(conn, id).await?;
        Ok((project_id, contract))
    }

    /// Persist status, milestones and end date of a locked contract.
    pub(crate) async fn write_back(
        conn: &mut PgConnection,
        engagement: &Engagement,
    ) -> Result<Contract, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET status_id = $2, milestones = $3, end_date = $4 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(engagement.id)
            .bind(engagement.status.id())
            .bind(Json(&engagement.milestones))
            .bind(engagement.end_date)
            .fetch_one(&mut *conn)
            .await
    }

    /// Side effects of a contract reaching COMPLETED. Callers only invoke
    /// this when [`Engagement::complete_if_done`] reported the transition,
    /// which happens at most once per contract.
    pub(crate) async fn apply_completion(
        conn: &mut PgConnection,
        engagement: &Engagement,
    ) -> Result<(), DbError> {
        ProjectRepo::set_status(conn, engagement.project_id, ProjectStatus::Completed).await?;
        ProfileRepo::record_completion(conn, engagement.freelancer_id).await?;
        tracing::info!(
            contract_id = engagement.id,
            freelancer_id = engagement.freelancer_id,
            "Contract completed"
        );
        Ok(())
    }
}
