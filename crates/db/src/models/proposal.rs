//! Proposal entity model and DTOs.

use gigboard_core::attachment::Attachment;
use gigboard_core::error::CoreError;
use gigboard_core::status::{EstimatedDuration, ProposalStatus, StatusId};
use gigboard_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::error::decode_status;

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub project_id: DbId,
    pub freelancer_id: DbId,
    pub cover_letter: String,
    pub bid_amount: Cents,
    pub estimated_duration_id: StatusId,
    pub attachments: Json<Vec<Attachment>>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Proposal {
    pub fn status(&self) -> Result<ProposalStatus, CoreError> {
        decode_status(self.status_id, ProposalStatus::from_id, "proposal")
    }
}

/// DTO for submitting a proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProposal {
    pub cover_letter: String,
    pub bid_amount: Cents,
    pub estimated_duration: EstimatedDuration,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}
