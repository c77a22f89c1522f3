//! Dispute and dispute-thread models and DTOs.

use gigboard_core::attachment::Attachment;
use gigboard_core::dispute::{ContractAction, DisputeParties, ResolutionOutcome};
use gigboard_core::error::CoreError;
use gigboard_core::status::{DisputeStatus, StatusId};
use gigboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::error::decode_status;

/// A row from the `disputes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dispute {
    pub id: DbId,
    pub contract_id: DbId,
    pub initiator_id: DbId,
    pub defendant_id: DbId,
    pub reason: String,
    pub evidence: Json<Vec<Attachment>>,
    pub status_id: StatusId,
    pub decision: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub contract_action: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Dispute {
    pub fn status(&self) -> Result<DisputeStatus, CoreError> {
        decode_status(self.status_id, DisputeStatus::from_id, "dispute")
    }

    pub fn parties(&self) -> DisputeParties {
        DisputeParties {
            initiator_id: self.initiator_id,
            defendant_id: self.defendant_id,
        }
    }
}

/// A row from the `dispute_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DisputeMessage {
    pub id: DbId,
    pub dispute_id: DbId,
    pub sender_id: DbId,
    pub text: String,
    pub attachments: Json<Vec<Attachment>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A dispute with its full message thread, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct DisputeThread {
    #[serde(flatten)]
    pub dispute: Dispute,
    pub messages: Vec<DisputeMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenDispute {
    pub reason: String,
    #[serde(default)]
    pub evidence: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessage {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Administrator's ruling.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveDispute {
    pub decision: String,
    pub outcome: ResolutionOutcome,
    #[serde(default)]
    pub contract_action: ContractAction,
}
