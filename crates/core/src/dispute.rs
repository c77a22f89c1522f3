//! Dispute workflow rules.
//!
//! OPEN -> UNDER_REVIEW -> {RESOLVED, REJECTED}; OPEN may also go straight
//! to a terminal state. While a dispute is OPEN or UNDER_REVIEW its contract
//! is DISPUTED, which freezes the milestone state machine.

use serde::{Deserialize, Serialize};

use crate::contract::party_of;
use crate::error::CoreError;
use crate::roles::Actor;
use crate::status::{ContractStatus, DisputeStatus};
use crate::types::DbId;

/// Maximum length for the reason given when opening a dispute.
pub const MAX_REASON_LENGTH: usize = 5_000;

/// Maximum length for a single thread message.
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Maximum length for an administrator's decision text.
pub const MAX_DECISION_LENGTH: usize = 10_000;

/// Statuses that hold the contract frozen.
pub fn is_active(status: DisputeStatus) -> bool {
    matches!(status, DisputeStatus::Open | DisputeStatus::UnderReview)
}

fn validate_text(text: &str, field: &str, max: usize) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::invalid_argument(format!("{field} must not be empty")));
    }
    if text.chars().count() > max {
        return Err(CoreError::invalid_argument(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_reason(reason: &str) -> Result<(), CoreError> {
    validate_text(reason, "Reason", MAX_REASON_LENGTH)
}

pub fn validate_message(text: &str) -> Result<(), CoreError> {
    validate_text(text, "Message", MAX_MESSAGE_LENGTH)
}

pub fn validate_decision(text: &str) -> Result<(), CoreError> {
    validate_text(text, "Decision", MAX_DECISION_LENGTH)
}

/// The two parties of a newly opened dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisputeParties {
    pub initiator_id: DbId,
    pub defendant_id: DbId,
}

/// Rules for opening a dispute. Returns who is initiator and defendant.
pub fn check_open(
    client_id: DbId,
    freelancer_id: DbId,
    actor: &Actor,
    contract_status: ContractStatus,
    has_active_dispute: bool,
) -> Result<DisputeParties, CoreError> {
    if party_of(client_id, freelancer_id, actor.user_id).is_none() {
        return Err(CoreError::forbidden(
            "Only a party to the contract can open a dispute",
        ));
    }
    if has_active_dispute {
        return Err(CoreError::conflict(
            "This contract already has an open dispute",
        ));
    }
    if contract_status != ContractStatus::Active {
        return Err(CoreError::invalid_state(format!(
            "Cannot open a dispute on a {contract_status} contract"
        )));
    }
    let defendant_id = if actor.user_id == client_id {
        freelancer_id
    } else {
        client_id
    };
    Ok(DisputeParties {
        initiator_id: actor.user_id,
        defendant_id,
    })
}

/// Initiator, defendant, or an administrator may post while not terminal.
pub fn check_message(
    parties: DisputeParties,
    status: DisputeStatus,
    actor: &Actor,
) -> Result<(), CoreError> {
    let involved = actor.user_id == parties.initiator_id || actor.user_id == parties.defendant_id;
    if !involved && !actor.is_admin() {
        return Err(CoreError::forbidden("Not a participant in this dispute"));
    }
    if !is_active(status) {
        return Err(CoreError::invalid_state(format!(
            "Dispute is {status}; the thread is closed"
        )));
    }
    Ok(())
}

/// Participants and administrators may read a dispute.
pub fn ensure_can_view(parties: DisputeParties, actor: &Actor) -> Result<(), CoreError> {
    if actor.is_admin()
        || actor.user_id == parties.initiator_id
        || actor.user_id == parties.defendant_id
    {
        Ok(())
    } else {
        Err(CoreError::forbidden("Not a participant in this dispute"))
    }
}

pub fn check_under_review(status: DisputeStatus, actor: &Actor) -> Result<(), CoreError> {
    if !actor.is_admin() {
        return Err(CoreError::forbidden("Only administrators review disputes"));
    }
    if status != DisputeStatus::Open {
        return Err(CoreError::invalid_state(format!(
            "Dispute is {status}; only open disputes can move under review"
        )));
    }
    Ok(())
}

pub fn check_resolve(status: DisputeStatus, actor: &Actor) -> Result<(), CoreError> {
    if !actor.is_admin() {
        return Err(CoreError::forbidden("Only administrators resolve disputes"));
    }
    if !is_active(status) {
        return Err(CoreError::invalid_state(format!(
            "Dispute is already {status}"
        )));
    }
    Ok(())
}

/// Terminal status chosen by the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// The complaint was upheld.
    Resolved,
    /// The complaint was dismissed.
    Rejected,
}

impl ResolutionOutcome {
    pub fn status(self) -> DisputeStatus {
        match self {
            ResolutionOutcome::Resolved => DisputeStatus::Resolved,
            ResolutionOutcome::Rejected => DisputeStatus::Rejected,
        }
    }
}

/// What happens to the frozen contract once the dispute closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAction {
    /// Back to ACTIVE; the milestone workflow continues.
    #[default]
    Resume,
    /// The engagement ends: contract and project become CANCELLED.
    Cancel,
}

impl ContractAction {
    pub fn contract_status(self) -> ContractStatus {
        match self {
            ContractAction::Resume => ContractStatus::Active,
            ContractAction::Cancel => ContractStatus::Cancelled,
        }
    }
}
