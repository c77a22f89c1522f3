//! Repository for the `freelancer_profiles` aggregate row.
//!
//! The cached counters are only changed through the `pub(crate)` helpers
//! below, each of which runs inside the caller's transaction.

use gigboard_core::reputation::{average_rating, success_rate};
use gigboard_core::types::{Cents, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::user::FreelancerProfile;

const COLUMNS: &str = "id, user_id, completed_projects, cancelled_projects, total_earnings, \
                       rating, total_reviews, success_rate, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<FreelancerProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM freelancer_profiles WHERE user_id = $1");
        sqlx::query_as::<_, FreelancerProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the profile row, creating it first if the account predates it.
    pub(crate) async fn lock(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<FreelancerProfile, sqlx::Error> {
        sqlx::query(
            "INSERT INTO freelancer_profiles (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM freelancer_profiles WHERE user_id = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, FreelancerProfile>(&query)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Add a paid milestone to `total_earnings`. The only writer of that field.
    pub(crate) async fn add_earnings(
        conn: &mut PgConnection,
        user_id: DbId,
        amount: Cents,
    ) -> Result<(), sqlx::Error> {
        Self::lock(conn, user_id).await?;
        sqlx::query(
            "UPDATE freelancer_profiles SET total_earnings = total_earnings + $2 \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Count one completed contract and refresh `success_rate`.
    pub(crate) async fn record_completion(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let profile = Self::lock(conn, user_id).await?;
        let completed = profile.completed_projects + 1;
        Self::write_outcomes(conn, user_id, completed, profile.cancelled_projects).await
    }

    /// Count one cancelled contract and refresh `success_rate`.
    pub(crate) async fn record_cancellation(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let profile = Self::lock(conn, user_id).await?;
        let cancelled = profile.cancelled_projects + 1;
        Self::write_outcomes(conn, user_id, profile.completed_projects, cancelled).await
    }

    async fn write_outcomes(
        conn: &mut PgConnection,
        user_id: DbId,
        completed: i32,
        cancelled: i32,
    ) -> Result<(), sqlx::Error> {
        let rate = success_rate(i64::from(completed), i64::from(cancelled));
        sqlx::query(
            "UPDATE freelancer_profiles \
             SET completed_projects = $2, cancelled_projects = $3, success_rate = $4 \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(completed)
        .bind(cancelled)
        .bind(rate)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Recompute `rating` and `total_reviews` from every review of the
    /// freelancer. The profile lock is taken before reading the reviews so
    /// the last writer always sees everything committed before it.
    pub(crate) async fn recompute_rating(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        Self::lock(conn, user_id).await?;
        let ratings: Vec<i16> =
            sqlx::query_scalar("SELECT rating FROM reviews WHERE freelancer_id = $1")
                .bind(user_id)
                .fetch_all(&mut *conn)
                .await?;

        sqlx::query(
            "UPDATE freelancer_profiles SET rating = $2, total_reviews = $3 WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(average_rating(&ratings))
        .bind(ratings.len() as i32)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
