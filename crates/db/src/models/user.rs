//! User account and freelancer profile models.

use gigboard_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub balance: Cents,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning an account.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// A row from the `freelancer_profiles` table.
///
/// Every counter here is maintained by the engine and read-only to callers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FreelancerProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub completed_projects: i32,
    pub cancelled_projects: i32,
    pub total_earnings: Cents,
    pub rating: f64,
    pub total_reviews: i32,
    pub success_rate: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
