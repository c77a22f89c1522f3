//! Repository for the `reviews` table.
//!
//! Every write recomputes the freelancer's `rating` and `total_reviews`
//! from the full review set inside the same transaction.

use gigboard_core::error::CoreError;
use gigboard_core::notice::{contract_link, Notice, NoticeKind};
use gigboard_core::reputation::{
    check_delete, check_submit, check_update, validate_comment, validate_rating,
};
use gigboard_core::roles::Actor;
use gigboard_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::{conflict_on_unique, DbError};
use crate::models::review::{CreateReview, Review, UpdateReview};
use crate::repositories::{ContractRepo, ProfileRepo};
use crate::Outcome;

const COLUMNS: &str =
    "id, contract_id, reviewer_id, freelancer_id, rating, comment, created_at, updated_at";

pub struct ReviewRepo;

impl ReviewRepo {
    /// Review the freelancer of a COMPLETED contract. Client only, once.
    pub async fn submit(
        pool: &PgPool,
        contract_id: DbId,
        actor: &Actor,
        input: &CreateReview,
    ) -> Result<Outcome<Review>, DbError> {
        validate_rating(input.rating)?;
        if let Some(comment) = &input.comment {
            validate_comment(comment)?;
        }

        let mut tx = pool.begin().await?;
        let contract = ContractRepo::lock(&mut tx, contract_id).await?;
        let already_reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE contract_id = $1 AND reviewer_id = $2)",
        )
        .bind(contract_id)
        .bind(actor.user_id)
        .fetch_one(&mut *tx)
        .await?;
        check_submit(contract.client_id, contract.status()?, actor, already_reviewed)?;

        let query = format!(
            "INSERT INTO reviews (contract_id, reviewer_id, freelancer_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(contract_id)
            .bind(actor.user_id)
            .bind(contract.freelancer_id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "This contract has already been reviewed"))?;
        ProfileRepo::recompute_rating(&mut tx, contract.freelancer_id).await?;
        tx.commit().await?;

        tracing::info!(
            review_id = review.id,
            contract_id,
            freelancer_id = contract.freelancer_id,
            rating = review.rating,
            "Review submitted"
        );
        let notice = Notice::new(
            contract.freelancer_id,
            NoticeKind::ReviewReceived,
            "New review",
            format!("You received a {}-star review for '{}'", review.rating, contract.title),
            contract_link(contract_id),
        );
        Ok(Outcome::new(review, vec![notice]))
    }

    /// Edit rating and/or comment. Author only.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        actor: &Actor,
        input: &UpdateReview,
    ) -> Result<Review, DbError> {
        if let Some(rating) = input.rating {
            validate_rating(rating)?;
        }
        if let Some(comment) = &input.comment {
            validate_comment(comment)?;
        }

        let mut tx = pool.begin().await?;
        let current = Self::lock(&mut tx, id).await?;
        check_update(current.reviewer_id, actor)?;

        let query = format!(
            "UPDATE reviews SET \
                 rating = COALESCE($2, rating), \
                 comment = COALESCE($3, comment) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(&mut *tx)
            .await?;
        ProfileRepo::recompute_rating(&mut tx, review.freelancer_id).await?;
        tx.commit().await?;
        Ok(review)
    }

    /// Remove a review. Author or administrator.
    pub async fn delete(pool: &PgPool, id: DbId, actor: &Actor) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        let current = Self::lock(&mut tx, id).await?;
        check_delete(current.reviewer_id, actor)?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ProfileRepo::recompute_rating(&mut tx, current.freelancer_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_for_freelancer(
        pool: &PgPool,
        freelancer_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews \
             WHERE freelancer_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(freelancer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Review, DbError> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::not_found("Review", id).into())
    }
}
