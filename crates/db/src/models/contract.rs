//! Contract entity model and DTOs.

use gigboard_core::contract::Engagement;
use gigboard_core::error::CoreError;
use gigboard_core::milestone::{Milestone, MilestoneDraft};
use gigboard_core::status::{ContractStatus, StatusId};
use gigboard_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::error::decode_status;

/// A row from the `contracts` table. `milestones` is the ordered JSONB array.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub project_id: DbId,
    pub proposal_id: DbId,
    pub client_id: DbId,
    pub freelancer_id: DbId,
    pub title: String,
    pub total_amount: Cents,
    pub status_id: StatusId,
    pub milestones: Json<Vec<Milestone>>,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contract {
    pub fn status(&self) -> Result<ContractStatus, CoreError> {
        decode_status(self.status_id, ContractStatus::from_id, "contract")
    }

    /// The mutable aggregate view of this row.
    pub fn engagement(&self) -> Result<Engagement, CoreError> {
        Ok(Engagement {
            id: self.id,
            project_id: self.project_id,
            client_id: self.client_id,
            freelancer_id: self.freelancer_id,
            title: self.title.clone(),
            status: self.status()?,
            milestones: self.milestones.0.clone(),
            end_date: self.end_date,
        })
    }

    pub fn progress(&self) -> u8 {
        gigboard_core::milestone::progress(&self.milestones.0)
    }
}

/// A contract together with its computed progress percentage.
#[derive(Debug, Clone, Serialize)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: Contract,
    pub progress: u8,
}

impl From<Contract> for ContractView {
    fn from(contract: Contract) -> Self {
        let progress = contract.progress();
        Self { contract, progress }
    }
}

/// DTO for creating a contract from an accepted proposal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContract {
    /// Omitted or empty: one milestone covering the whole bid.
    pub milestones: Option<Vec<MilestoneDraft>>,
}
