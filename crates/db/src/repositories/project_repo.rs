//! Repository for the `projects` table.

use gigboard_core::error::CoreError;
use gigboard_core::notice::{project_link, Notice, NoticeKind};
use gigboard_core::project::{
    ensure_can_post, ensure_open, ensure_owner, validate_budget, validate_description,
    validate_skills, validate_title,
};
use gigboard_core::roles::Actor;
use gigboard_core::status::{BudgetType, ProjectStatus, ProposalStatus};
use gigboard_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::Outcome;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, client_id, title, description, category, skills, budget_min, \
                       budget_max, budget_type_id, status_id, assigned_freelancer_id, \
                       proposal_count, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Post a new OPEN project owned by `actor`.
    pub async fn create(
        pool: &PgPool,
        actor: &Actor,
        input: &CreateProject,
    ) -> Result<Project, DbError> {
        ensure_can_post(actor)?;
        validate_title(&input.title)?;
        validate_description(&input.description)?;
        validate_skills(&input.skills)?;
        validate_budget(input.budget_min, input.budget_max)?;

        let query = format!(
            "INSERT INTO projects \
                 (client_id, title, description, category, skills, budget_min, budget_max, \
                  budget_type_id, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(actor.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.skills)
            .bind(input.budget_min)
            .bind(input.budget_max)
            .bind(input.budget_type.unwrap_or(BudgetType::Fixed).id())
            .bind(ProjectStatus::Open.id())
            .fetch_one(pool)
            .await?;
        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Like [`Self::find_by_id`] but a missing row is `NotFound`.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Project, DbError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id).into())
    }

    /// OPEN projects, newest first.
    pub async fn list_open(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE status_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(ProjectStatus::Open.id())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE client_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(client_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Edit an OPEN project. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        actor: &Actor,
        input: &UpdateProject,
    ) -> Result<Project, DbError> {
        let mut tx = pool.begin().await?;
        let current = Self::lock(&mut tx, id).await?;
        ensure_owner(current.client_id, actor)?;
        ensure_open(current.status()?, "edit")?;

        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(description) = &input.description {
            validate_description(description)?;
        }
        if let Some(skills) = &input.skills {
            validate_skills(skills)?;
        }
        validate_budget(
            input.budget_min.unwrap_or(current.budget_min),
            input.budget_max.unwrap_or(current.budget_max),
        )?;

        let query = format!(
            "UPDATE projects SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 category = COALESCE($4, category), \
                 skills = COALESCE($5, skills), \
                 budget_min = COALESCE($6, budget_min), \
                 budget_max = COALESCE($7, budget_max), \
                 budget_type_id = COALESCE($8, budget_type_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.skills)
            .bind(input.budget_min)
            .bind(input.budget_max)
            .bind(input.budget_type.map(BudgetType::id))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(project)
    }

    /// Cancel an OPEN project; every PENDING proposal is rejected with it.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        actor: &Actor,
    ) -> Result<Outcome<Project>, DbError> {
        let mut tx = pool.begin().await?;
        let current = Self::lock(&mut tx, id).await?;
        ensure_owner(current.client_id, actor)?;
        ensure_open(current.status()?, "cancel")?;

        let rejected: Vec<DbId> = sqlx::query_scalar(
            "UPDATE proposals SET status_id = $2 \
             WHERE project_id = $1 AND status_id = $3 \
             RETURNING freelancer_id",
        )
        .bind(id)
        .bind(ProposalStatus::Rejected.id())
        .bind(ProposalStatus::Pending.id())
        .fetch_all(&mut *tx)
        .await?;

        let project = Self::set_status(&mut tx, id, ProjectStatus::Cancelled).await?;
        tx.commit().await?;

        tracing::info!(project_id = id, rejected = rejected.len(), "Project cancelled");
        let notices = rejected
            .into_iter()
            .map(|freelancer_id| {
                Notice::new(
                    freelancer_id,
                    NoticeKind::ProposalRejected,
                    "Project cancelled",
                    format!("'{}' was cancelled by the client", project.title),
                    project_link(id),
                )
            })
            .collect();
        Ok(Outcome::new(project, notices))
    }

    /// Delete an OPEN project. Its proposals go with it.
    pub async fn delete(pool: &PgPool, id: DbId, actor: &Actor) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        let current = Self::lock(&mut tx, id).await?;
        ensure_owner(current.client_id, actor)?;
        ensure_open(current.status()?, "delete")?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// `SELECT ... FOR UPDATE` on the project row, the aggregate root for
    /// proposal acceptance and everything that follows from it.
    pub(crate) async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Project, DbError> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id).into())
    }

    pub(crate) async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ProjectStatus,
    ) -> Result<Project, sqlx::Error> {
        let query = format!("UPDATE projects SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_one(&mut *conn)
            .await
    }

    /// Move the project to IN_PROGRESS with its assigned freelancer.
    pub(crate) async fn assign(
        conn: &mut PgConnection,
        id: DbId,
        freelancer_id: DbId,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $2, assigned_freelancer_id = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::InProgress.id())
            .bind(freelancer_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Recompute `proposal_count` from the live rows rather than adjusting it.
    pub(crate) async fn sync_proposal_count(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE projects SET proposal_count = ( \
                 SELECT COUNT(*) FROM proposals WHERE project_id = $1 AND status_id <> $2 \
             ) \
             WHERE id = $1 \
             RETURNING proposal_count",
        )
        .bind(id)
        .bind(ProposalStatus::Withdrawn.id())
        .fetch_one(&mut *conn)
        .await
    }
}
