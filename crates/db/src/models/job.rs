//! Job board models and DTOs.

use gigboard_core::error::CoreError;
use gigboard_core::status::{JobStatus, StatusId};
use gigboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::decode_status;

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub company_id: DbId,
    pub title: String,
    pub description: String,
    pub status_id: StatusId,
    pub application_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    pub fn status(&self) -> Result<JobStatus, CoreError> {
        decode_status(self.status_id, JobStatus::from_id, "job")
    }
}

/// A row from the `job_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobApplication {
    pub id: DbId,
    pub job_id: DbId,
    pub applicant_id: DbId,
    pub cover_letter: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJob {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyToJob {
    pub cover_letter: String,
}
