//! The per-user notification inbox.
//!
//! Rows are written by the event-bus writer after an operation commits,
//! never inside an engine transaction.

use gigboard_core::notice::Notice;
use gigboard_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::notification::Notification;

const COLUMNS: &str = "id, user_id, kind, title, body, link, is_read, read_at, created_at, updated_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(pool: &PgPool, notice: &Notice) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (user_id, kind, title, body, link) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(notice.recipient_id)
        .bind(notice.kind.as_str())
        .bind(&notice.title)
        .bind(&notice.body)
        .bind(&notice.link)
        .fetch_one(pool)
        .await
    }

    /// Newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM notifications WHERE user_id = "));
        query.push_bind(user_id);
        if unread_only {
            query.push(" AND NOT is_read");
        }
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        query.build_query_as().fetch_all(pool).await
    }

    /// `false` when the row is missing, belongs to someone else, or was
    /// already read.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND NOT is_read",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();
        Ok(updated == 1)
    }

    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        Ok(sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
