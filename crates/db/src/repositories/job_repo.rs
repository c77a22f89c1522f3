//! Repository for job postings and applications.

use gigboard_core::error::CoreError;
use gigboard_core::job::{check_apply, check_close, check_withdraw_application, ensure_can_post};
use gigboard_core::notice::{job_link, Notice, NoticeKind};
use gigboard_core::project::{validate_description, validate_title};
use gigboard_core::proposal::validate_cover_letter;
use gigboard_core::roles::Actor;
use gigboard_core::status::JobStatus;
use gigboard_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::{conflict_on_unique, DbError};
use crate::models::job::{ApplyToJob, CreateJob, Job, JobApplication};
use crate::Outcome;

const COLUMNS: &str =
    "id, company_id, title, description, status_id, application_count, created_at, updated_at";

const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, cover_letter, created_at, updated_at";

pub struct JobRepo;

impl JobRepo {
    pub async fn create(pool: &PgPool, actor: &Actor, input: &CreateJob) -> Result<Job, DbError> {
        ensure_can_post(actor)?;
        validate_title(&input.title)?;
        validate_description(&input.description)?;

        let query = format!(
            "INSERT INTO jobs (company_id, title, description, status_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(actor.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(JobStatus::Open.id())
            .fetch_one(pool)
            .await?;
        Ok(job)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_open(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE status_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Open.id())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn close(pool: &PgPool, id: DbId, actor: &Actor) -> Result<Job, DbError> {
        let mut tx = pool.begin().await?;
        let job = Self::lock(&mut tx, id).await?;
        check_close(job.status()?, job.company_id, actor)?;

        let query = format!("UPDATE jobs SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let closed = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobStatus::Closed.id())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(closed)
    }

    /// Apply to an OPEN job; `application_count` is recomputed afterwards.
    pub async fn apply(
        pool: &PgPool,
        job_id: DbId,
        actor: &Actor,
        input: &ApplyToJob,
    ) -> Result<Outcome<JobApplication>, DbError> {
        validate_cover_letter(&input.cover_letter)?;

        let mut tx = pool.begin().await?;
        let job = Self::lock(&mut tx, job_id).await?;
        let already_applied: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM job_applications WHERE job_id = $1 AND applicant_id = $2 \
             )",
        )
        .bind(job_id)
        .bind(actor.user_id)
        .fetch_one(&mut *tx)
        .await?;
        check_apply(job.status()?, job.company_id, actor, already_applied)?;

        let query = format!(
            "INSERT INTO job_applications (job_id, applicant_id, cover_letter) \
             VALUES ($1, $2, $3) \
             RETURNING {APPLICATION_COLUMNS}"
        );
        let application = sqlx::query_as::<_, JobApplication>(&query)
            .bind(job_id)
            .bind(actor.user_id)
            .bind(&input.cover_letter)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "You have already applied to this job"))?;
        Self::sync_application_count(&mut tx, job_id).await?;
        tx.commit().await?;

        let notice = Notice::new(
            job.company_id,
            NoticeKind::ApplicationReceived,
            "New application",
            format!("Someone applied to '{}'", job.title),
            job_link(job_id),
        );
        Ok(Outcome::new(application, vec![notice]))
    }

    /// Withdraw (delete) an application. Applicant only.
    pub async fn withdraw_application(
        pool: &PgPool,
        application_id: DbId,
        actor: &Actor,
    ) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        let job_id: DbId =
            sqlx::query_scalar("SELECT job_id FROM job_applications WHERE id = $1")
                .bind(application_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::not_found("JobApplication", application_id))?;
        Self::lock(&mut tx, job_id).await?;

        let applicant_id: DbId = sqlx::query_scalar(
            "SELECT applicant_id FROM job_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::not_found("JobApplication", application_id))?;
        check_withdraw_application(applicant_id, actor)?;

        sqlx::query("DELETE FROM job_applications WHERE id = $1")
            .bind(application_id)
            .execute(&mut *tx)
            .await?;
        Self::sync_application_count(&mut tx, job_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Applications to a job. Owner and administrators only.
    pub async fn list_applications(
        pool: &PgPool,
        job_id: DbId,
        actor: &Actor,
    ) -> Result<Vec<JobApplication>, DbError> {
        let job = Self::find_by_id(pool, job_id)
            .await?
            .ok_or(CoreError::not_found("Job", job_id))?;
        if job.company_id != actor.user_id && !actor.is_admin() {
            return Err(CoreError::forbidden("Only the job owner can list applications").into());
        }
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications \
             WHERE job_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, JobApplication>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Job, DbError> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::not_found("Job", id).into())
    }

    /// Recompute `application_count` from the live rows.
    async fn sync_application_count(conn: &mut PgConnection, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE jobs SET application_count = ( \
                 SELECT COUNT(*) FROM job_applications WHERE job_id = $1 \
             ) \
             WHERE id = $1 \
             RETURNING application_count",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await
    }
}
