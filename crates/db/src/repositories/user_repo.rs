//! Repository for the `users` table.

use gigboard_core::roles::{validate_role, ROLE_FREELANCER};
use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::error::{conflict_on_unique, DbError};
use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, display_name, role, balance, created_at, updated_at";

/// Account provisioning and lookup. Authentication lives elsewhere.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user, plus an empty profile row for freelancers.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, DbError> {
        validate_role(&input.role)?;

        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO users (email, display_name, role) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.role)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "Email is already registered"))?;

        if user.role == ROLE_FREELANCER {
            sqlx::query("INSERT INTO freelancer_profiles (user_id) VALUES ($1)")
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(user_id = user.id, role = %user.role, "User provisioned");
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
