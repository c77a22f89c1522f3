//! Repository for disputes and their message threads.
//!
//! Opening a dispute freezes the contract (DISPUTED); resolving it always
//! lifts the freeze, either resuming or cancelling the engagement.

use chrono::Utc;
use gigboard_core::attachment::validate_attachments;
use gigboard_core::dispute::{
    check_message, check_open, check_resolve, check_under_review, ensure_can_view,
    validate_decision, validate_message, validate_reason, ContractAction,
};
use gigboard_core::error::CoreError;
use gigboard_core::notice::{contract_link, dispute_link, Notice, NoticeKind};
use gigboard_core::roles::Actor;
use gigboard_core::status::{ContractStatus, DisputeStatus, ProjectStatus};
use gigboard_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::error::{conflict_on_unique, DbError};
use crate::models::dispute::{
    Dispute, DisputeMessage, DisputeThread, OpenDispute, PostMessage, ResolveDispute,
};
use crate::repositories::{ContractRepo, ProfileRepo, ProjectRepo};
use crate::Outcome;

const COLUMNS: &str = "id, contract_id, initiator_id, defendant_id, reason, evidence, status_id, \
                       decision, decided_by, decided_at, contract_action, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, dispute_id, sender_id, text, attachments, created_at, updated_at";

pub struct DisputeRepo;

impl DisputeRepo {
    /// Open a dispute on an ACTIVE contract and freeze it.
    pub async fn open(
        pool: &PgPool,
        contract_id: DbId,
        actor: &Actor,
        input: &OpenDispute,
    ) -> Result<Outcome<Dispute>, DbError> {
        validate_reason(&input.reason)?;
        validate_attachments(&input.evidence)?;

        let mut tx = pool.begin().await?;
        let contract = ContractRepo::lock(&mut tx, contract_id).await?;
        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM disputes WHERE contract_id = $1 AND status_id IN ($2, $3) \
             )",
        )
        .bind(contract_id)
        .bind(DisputeStatus::Open.id())
        .bind(DisputeStatus::UnderReview.id())
        .fetch_one(&mut *tx)
        .await?;
        let parties = check_open(
            contract.client_id,
            contract.freelancer_id,
            actor,
            contract.status()?,
            has_active,
        )?;

        let query = format!(
            "INSERT INTO disputes (contract_id, initiator_id, defendant_id, reason, evidence, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let dispute = sqlx::query_as::<_, Dispute>(&query)
            .bind(contract_id)
            .bind(parties.initiator_id)
            .bind(parties.defendant_id)
            .bind(&input.reason)
            .bind(Json(&input.evidence))
            .bind(DisputeStatus::Open.id())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "This contract already has an open dispute"))?;

        sqlx::query("UPDATE contracts SET status_id = $2 WHERE id = $1")
            .bind(contract_id)
            .bind(ContractStatus::Disputed.id())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            dispute_id = dispute.id,
            contract_id,
            initiator_id = parties.initiator_id,
            "Dispute opened"
        );
        let notice = Notice::new(
            parties.defendant_id,
            NoticeKind::DisputeOpened,
            "Dispute opened",
            format!("A dispute was opened on '{}'", contract.title),
            dispute_link(dispute.id),
        );
        Ok(Outcome::new(dispute, vec![notice]))
    }

    /// Append to the thread of a dispute that is not yet closed.
    pub async fn add_message(
        pool: &PgPool,
        dispute_id: DbId,
        actor: &Actor,
        input: &PostMessage,
    ) -> Result<Outcome<DisputeMessage>, DbError> {
        validate_message(&input.text)?;
        validate_attachments(&input.attachments)?;

        let mut tx = pool.begin().await?;
        let dispute = Self::lock(&mut tx, dispute_id).await?;
        check_message(dispute.parties(), dispute.status()?, actor)?;

        let query = format!(
            "INSERT INTO dispute_messages (dispute_id, sender_id, text, attachments) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, DisputeMessage>(&query)
            .bind(dispute_id)
            .bind(actor.user_id)
            .bind(&input.text)
            .bind(Json(&input.attachments))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let notices = [dispute.initiator_id, dispute.defendant_id]
            .into_iter()
            .filter(|&recipient| recipient != actor.user_id)
            .map(|recipient| {
                Notice::new(
                    recipient,
                    NoticeKind::DisputeMessage,
                    "New dispute message",
                    "A new message was posted in your dispute",
                    dispute_link(dispute_id),
                )
            })
            .collect();
        Ok(Outcome::new(message, notices))
    }

    /// OPEN -> UNDER_REVIEW. Administrators only.
    pub async fn mark_under_review(
        pool: &PgPool,
        dispute_id: DbId,
        actor: &Actor,
    ) -> Result<Outcome<Dispute>, DbError> {
        let mut tx = pool.begin().await?;
        let dispute = Self::lock(&mut tx, dispute_id).await?;
        check_under_review(dispute.status()?, actor)?;

        let query = format!("UPDATE disputes SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let updated = sqlx::query_as::<_, Dispute>(&query)
            .bind(dispute_id)
            .bind(DisputeStatus::UnderReview.id())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(dispute_id, admin_id = actor.user_id, "Dispute under review");
        let notices = Self::both_parties(&updated, |recipient| {
            Notice::new(
                recipient,
                NoticeKind::DisputeUnderReview,
                "Dispute under review",
                "An administrator is reviewing your dispute",
                dispute_link(dispute_id),
            )
        });
        Ok(Outcome::new(updated, notices))
    }

    /// Record the administrator's ruling and lift the contract freeze.
    ///
    /// `ContractAction::Resume` returns the contract to ACTIVE and re-runs
    /// the completion check. `ContractAction::Cancel` ends the engagement:
    /// contract and project become CANCELLED and the freelancer's
    /// success rate is recomputed.
    pub async fn resolve(
        pool: &PgPool,
        dispute_id: DbId,
        actor: &Actor,
        input: &ResolveDispute,
    ) -> Result<Outcome<Dispute>, DbError> {
        validate_decision(&input.decision)?;

        let mut tx = pool.begin().await?;
        let contract_id: DbId =
            sqlx::query_scalar("SELECT contract_id FROM disputes WHERE id = $1")
                .bind(dispute_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::not_found("Dispute", dispute_id))?;
        let (project_id, contract) = ContractRepo::lock_with_project(&mut tx, contract_id).await?;
        let dispute = Self::lock(&mut tx, dispute_id).await?;
        check_resolve(dispute.status()?, actor)?;

        let status = input.outcome.status();
        let action_label = match input.contract_action {
            ContractAction::Resume => "resume",
            ContractAction::Cancel => "cancel",
        };
        let query = format!(
            "UPDATE disputes \
             SET status_id = $2, decision = $3, decided_by = $4, decided_at = NOW(), \
                 contract_action = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let resolved = sqlx::query_as::<_, Dispute>(&query)
            .bind(dispute_id)
            .bind(status.id())
            .bind(&input.decision)
            .bind(actor.user_id)
            .bind(action_label)
            .fetch_one(&mut *tx)
            .await?;

        let mut engagement = contract.engagement()?;
        let mut notices = Self::both_parties(&resolved, |recipient| {
            Notice::new(
                recipient,
                NoticeKind::DisputeClosed,
                "Dispute closed",
                format!("Your dispute on '{}' was {status}", contract.title),
                dispute_link(dispute_id),
            )
        });

        if engagement.status == ContractStatus::Disputed {
            let now = Utc::now();
            match input.contract_action {
                ContractAction::Resume => {
                    engagement.status = ContractStatus::Active;
                    let completed = engagement.complete_if_done(now);
                    ContractRepo::write_back(&mut tx, &engagement).await?;
                    notices.extend(Self::contract_notices(
                        &engagement,
                        NoticeKind::ContractResumed,
                        "Contract resumed",
                    ));
                    if completed {
                        ContractRepo::apply_completion(&mut tx, &engagement).await?;
                        notices.extend(engagement.completion_notices());
                    }
                }
                ContractAction::Cancel => {
                    engagement.status = ContractStatus::Cancelled;
                    engagement.end_date = Some(now);
                    ContractRepo::write_back(&mut tx, &engagement).await?;
                    ProjectRepo::set_status(&mut tx, project_id, ProjectStatus::Cancelled).await?;
                    ProfileRepo::record_cancellation(&mut tx, engagement.freelancer_id).await?;
                    notices.extend(Self::contract_notices(
                        &engagement,
                        NoticeKind::ContractCancelled,
                        "Contract cancelled",
                    ));
                }
            }
        }
        tx.commit().await?;

        tracing::info!(
            dispute_id,
            contract_id,
            admin_id = actor.user_id,
            outcome = %status,
            contract_action = action_label,
            "Dispute resolved"
        );
        Ok(Outcome::new(resolved, notices))
    }

    /// A dispute with its thread. Participants and administrators only.
    pub async fn get(
        pool: &PgPool,
        dispute_id: DbId,
        actor: &Actor,
    ) -> Result<DisputeThread, DbError> {
        let dispute = Self::find_by_id(pool, dispute_id)
            .await?
            .ok_or(CoreError::not_found("Dispute", dispute_id))?;
        ensure_can_view(dispute.parties(), actor)?;

        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM dispute_messages \
             WHERE dispute_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, DisputeMessage>(&query)
            .bind(dispute_id)
            .fetch_all(pool)
            .await?;
        Ok(DisputeThread { dispute, messages })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dispute>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM disputes WHERE id = $1");
        sqlx::query_as::<_, Dispute>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Disputes the user opened or is defending, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM disputes \
             WHERE initiator_id = $1 OR defendant_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Dispute>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Administrator queue. `None` lists every status.
    pub async fn list_by_status(
        pool: &PgPool,
        status: Option<DisputeStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM disputes \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Dispute>(&query)
            .bind(status.map(DisputeStatus::id))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Dispute, DbError> {
        let query = format!("SELECT {COLUMNS} FROM disputes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Dispute>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::not_found("Dispute", id).into())
    }

    fn both_parties(dispute: &Dispute, make: impl Fn(DbId) -> Notice) -> Vec<Notice> {
        vec![make(dispute.initiator_id), make(dispute.defendant_id)]
    }

    fn contract_notices(
        engagement: &gigboard_core::contract::Engagement,
        kind: NoticeKind,
        title: &str,
    ) -> Vec<Notice> {
        [engagement.client_id, engagement.freelancer_id]
            .into_iter()
            .map(|recipient| {
                Notice::new(
                    recipient,
                    kind,
                    title,
                    format!("'{}' is now {}", engagement.title, engagement.status),
                    contract_link(engagement.id),
                )
            })
            .collect()
    }
}
