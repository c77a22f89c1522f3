//! Repository for the `proposals` table and the accept cascade.

use gigboard_core::attachment::validate_attachments;
use gigboard_core::error::CoreError;
use gigboard_core::notice::{project_link, Notice, NoticeKind};
use gigboard_core::proposal::{
    check_accept, check_delete, check_reject, check_submit, check_withdraw, validate_bid,
    validate_cover_letter,
};
use gigboard_core::roles::Actor;
use gigboard_core::status::ProposalStatus;
use gigboard_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::error::{conflict_on_unique, DbError};
use crate::models::project::Project;
use crate::models::proposal::{CreateProposal, Proposal};
use crate::repositories::ProjectRepo;
use crate::Outcome;

const COLUMNS: &str = "id, project_id, freelancer_id, cover_letter, bid_amount, \
                       estimated_duration_id, attachments, status_id, created_at, updated_at";

pub struct ProposalRepo;

impl ProposalRepo {
    /// Submit a bid. Serialized per project by the project row lock.
    pub async fn submit(
        pool: &PgPool,
        project_id: DbId,
        actor: &Actor,
        input: &CreateProposal,
    ) -> Result<Outcome<Proposal>, DbError> {
        validate_bid(input.bid_amount)?;
        validate_cover_letter(&input.cover_letter)?;
        validate_attachments(&input.attachments)?;

        let mut tx = pool.begin().await?;
        let project = ProjectRepo::lock(&mut tx, project_id).await?;
        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM proposals \
                 WHERE project_id = $1 AND freelancer_id = $2 AND status_id <> $3 \
             )",
        )
        .bind(project_id)
        .bind(actor.user_id)
        .bind(ProposalStatus::Withdrawn.id())
        .fetch_one(&mut *tx)
        .await?;
        check_submit(project.status()?, project.client_id, actor, has_active)?;

        let query = format!(
            "INSERT INTO proposals \
                 (project_id, freelancer_id, cover_letter, bid_amount, estimated_duration_id, \
                  attachments, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let proposal = sqlx::query_as::<_, Proposal>(&query)
            .bind(project_id)
            .bind(actor.user_id)
            .bind(&input.cover_letter)
            .bind(input.bid_amount)
            .bind(input.estimated_duration.id())
            .bind(Json(&input.attachments))
            .bind(ProposalStatus::Pending.id())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                conflict_on_unique(
                    e,
                    "A proposal from this freelancer already exists for this project",
                )
            })?;
        ProjectRepo::sync_proposal_count(&mut tx, project_id).await?;
        tx.commit().await?;

        tracing::info!(
            proposal_id = proposal.id,
            project_id,
            freelancer_id = actor.user_id,
            "Proposal submitted"
        );
        let notice = Notice::new(
            project.client_id,
            NoticeKind::ProposalReceived,
            "New proposal",
            format!("You received a new proposal on '{}'", project.title),
            project_link(project_id),
        );
        Ok(Outcome::new(proposal, vec![notice]))
    }

    /// Accept one proposal. In a single transaction: the proposal becomes
    /// ACCEPTED, every other PENDING sibling becomes REJECTED, and the project
    /// moves to IN_PROGRESS assigned to the freelancer.
    ///
    /// A concurrent accept on a sibling waits on the project lock, then sees
    /// the accepted sibling and fails with `Conflict`.
    pub async fn accept(
        pool: &PgPool,
        proposal_id: DbId,
        actor: &Actor,
    ) -> Result<Outcome<Proposal>, DbError> {
        let mut tx = pool.begin().await?;
        let (project, proposal) = Self::lock_with_project(&mut tx, proposal_id).await?;

        let sibling_accepted: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM proposals \
                 WHERE project_id = $1 AND id <> $2 AND status_id = $3 \
             )",
        )
        .bind(project.id)
        .bind(proposal_id)
        .bind(ProposalStatus::Accepted.id())
        .fetch_one(&mut *tx)
        .await?;
        check_accept(
            proposal.status()?,
            project.status()?,
            project.client_id,
            actor,
            sibling_accepted,
        )?;

        let accepted = Self::set_status(&mut tx, proposal_id, ProposalStatus::Accepted).await?;
        let rejected: Vec<DbId> = sqlx::query_scalar(
            "UPDATE proposals SET status_id = $3 \
             WHERE project_id = $1 AND id <> $2 AND status_id = $4 \
             RETURNING freelancer_id",
        )
        .bind(project.id)
        .bind(proposal_id)
        .bind(ProposalStatus::Rejected.id())
        .bind(ProposalStatus::Pending.id())
        .fetch_all(&mut *tx)
        .await?;
        ProjectRepo::assign(&mut tx, project.id, accepted.freelancer_id).await?;
        tx.commit().await?;

        tracing::info!(
            proposal_id,
            project_id = project.id,
            freelancer_id = accepted.freelancer_id,
            rejected = rejected.len(),
            "Proposal accepted"
        );
        let mut notices = vec![Notice::new(
            accepted.freelancer_id,
            NoticeKind::ProposalAccepted,
            "Proposal accepted",
            format!("Your proposal on '{}' was accepted", project.title),
            project_link(project.id),
        )];
        notices.extend(rejected.into_iter().map(|freelancer_id| {
            Notice::new(
                freelancer_id,
                NoticeKind::ProposalRejected,
                "Proposal not selected",
                format!("Another proposal was accepted for '{}'", project.title),
                project_link(project.id),
            )
        }));
        Ok(Outcome::new(accepted, notices))
    }

    pub async fn reject(
        pool: &PgPool,
        proposal_id: DbId,
        actor: &Actor,
    ) -> Result<Outcome<Proposal>, DbError> {
        let mut tx = pool.begin().await?;
        let (project, proposal) = Self::lock_with_project(&mut tx, proposal_id).await?;
        check_reject(proposal.status()?, project.client_id, actor)?;
        let rejected = Self::set_status(&mut tx, proposal_id, ProposalStatus::Rejected).await?;
        tx.commit().await?;

        let notice = Notice::new(
            rejected.freelancer_id,
            NoticeKind::ProposalRejected,
            "Proposal declined",
            format!("Your proposal on '{}' was declined", project.title),
            project_link(project.id),
        );
        Ok(Outcome::new(rejected, vec![notice]))
    }

    /// Withdraw a PENDING proposal. The project's count drops accordingly.
    pub async fn withdraw(
        pool: &PgPool,
        proposal_id: DbId,
        actor: &Actor,
    ) -> Result<Proposal, DbError> {
        let mut tx = pool.begin().await?;
        let (project, proposal) = Self::lock_with_project(&mut tx, proposal_id).await?;
        check_withdraw(proposal.status()?, proposal.freelancer_id, actor)?;
        let withdrawn = Self::set_status(&mut tx, proposal_id, ProposalStatus::Withdrawn).await?;
        ProjectRepo::sync_proposal_count(&mut tx, project.id).await?;
        tx.commit().await?;
        Ok(withdrawn)
    }

    /// Permanently remove a proposal that never backed a contract.
    pub async fn delete(pool: &PgPool, proposal_id: DbId, actor: &Actor) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        let (project, proposal) = Self::lock_with_project(&mut tx, proposal_id).await?;
        check_delete(proposal.status()?, proposal.freelancer_id, actor)?;
        sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(proposal_id)
            .execute(&mut *tx)
            .await?;
        ProjectRepo::sync_proposal_count(&mut tx, project.id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Proposals on a project. Visible to the project owner and admins only.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        actor: &Actor,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Proposal>, DbError> {
        let project = ProjectRepo::get(pool, project_id).await?;
        if project.client_id != actor.user_id && !actor.is_admin() {
            return Err(CoreError::forbidden("Only the project owner can list its proposals").into());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM proposals \
             WHERE project_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Proposal>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_for_freelancer(
        pool: &PgPool,
        freelancer_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals \
             WHERE freelancer_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(freelancer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Lock the owning project, then the proposal itself.
    ///
    /// The proposal is re-read after the project lock is held, so its status
    /// reflects any cascade that committed while this caller was waiting.
    pub(crate) async fn lock_with_project(
        conn: &mut PgConnection,
        proposal_id: DbId,
    ) -> Result<(Project, Proposal), DbError> {
        let project_id: DbId =
            sqlx::query_scalar("SELECT project_id FROM proposals WHERE id = $1")
                .bind(proposal_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or(CoreError::not_found("Proposal", proposal_id))?;

        let project = ProjectRepo::lock(conn, project_id).await?;
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1 FOR UPDATE");
        let proposal = sqlx::query_as::<_, Proposal>(&query)
            .bind(proposal_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(CoreError::not_found("Proposal", proposal_id))?;
        Ok((project, proposal))
    }

    async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ProposalStatus,
    ) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_one(&mut *conn)
            .await
    }
}
