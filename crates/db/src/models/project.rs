//! Project entity model and DTOs.

use gigboard_core::error::CoreError;
use gigboard_core::status::{BudgetType, ProjectStatus, StatusId};
use gigboard_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::decode_status;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub client_id: DbId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub skills: Vec<String>,
    pub budget_min: Cents,
    pub budget_max: Cents,
    pub budget_type_id: StatusId,
    pub status_id: StatusId,
    pub assigned_freelancer_id: Option<DbId>,
    pub proposal_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn status(&self) -> Result<ProjectStatus, CoreError> {
        decode_status(self.status_id, ProjectStatus::from_id, "project")
    }
}

/// DTO for posting a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub budget_min: Cents,
    pub budget_max: Cents,
    /// Defaults to fixed price.
    pub budget_type: Option<BudgetType>,
}

/// DTO for editing an OPEN project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub skills: Option<Vec<String>>,
    pub budget_min: Option<Cents>,
    pub budget_max: Option<Cents>,
    pub budget_type: Option<BudgetType>,
}
