//! Proposal (bid) rules.
//!
//! The caller loads the project row under a lock before invoking any of the
//! `check_*` functions, so the facts passed in are stable for the rest of
//! the transaction.

use crate::error::CoreError;
use crate::roles::Actor;
use crate::status::{ProjectStatus, ProposalStatus};
use crate::types::{Cents, DbId};

/// Maximum length for a cover letter.
pub const MAX_COVER_LETTER_LENGTH: usize = 5_000;

pub fn validate_bid(bid: Cents) -> Result<(), CoreError> {
    if bid <= 0 {
        return Err(CoreError::invalid_argument(
            "Bid amount must be greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_cover_letter(cover_letter: &str) -> Result<(), CoreError> {
    if cover_letter.trim().is_empty() {
        return Err(CoreError::invalid_argument("Cover letter must not be empty"));
    }
    if cover_letter.chars().count() > MAX_COVER_LETTER_LENGTH {
        return Err(CoreError::invalid_argument(format!(
            "Cover letter exceeds {MAX_COVER_LETTER_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Rules for submitting a new proposal.
///
/// `has_active_proposal` is whether a non-withdrawn proposal already exists
/// for this (project, freelancer) pair.
pub fn check_submit(
    project_status: ProjectStatus,
    project_client_id: DbId,
    actor: &Actor,
    has_active_proposal: bool,
) -> Result<(), CoreError> {
    if actor.user_id == project_client_id {
        return Err(CoreError::forbidden(
            "Project owners cannot bid on their own project",
        ));
    }
    if !actor.is_freelancer() {
        return Err(CoreError::forbidden("Only freelancers can submit proposals"));
    }
    if project_status != ProjectStatus::Open {
        return Err(CoreError::invalid_state(format!(
            "Project is {project_status}, not accepting proposals"
        )));
    }
    if has_active_proposal {
        return Err(CoreError::conflict(
            "A proposal from this freelancer already exists for this project",
        ));
    }
    Ok(())
}

/// Rules for accepting a proposal.
///
/// `accepted_sibling_exists` covers the race where another accept on the
/// same project committed first: that caller must see `Conflict`, not a
/// generic state error.
pub fn check_accept(
    proposal_status: ProposalStatus,
    project_status: ProjectStatus,
    project_client_id: DbId,
    actor: &Actor,
    accepted_sibling_exists: bool,
) -> Result<(), CoreError> {
    if actor.user_id != project_client_id {
        return Err(CoreError::forbidden(
            "Only the project owner can accept proposals",
        ));
    }
    if accepted_sibling_exists {
        return Err(CoreError::conflict(
            "Another proposal has already been accepted for this project",
        ));
    }
    if project_status != ProjectStatus::Open {
        return Err(CoreError::invalid_state(format!(
            "Project is {project_status}, proposals can no longer be accepted"
        )));
    }
    if proposal_status != ProposalStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "Proposal is {proposal_status}, only pending proposals can be accepted"
        )));
    }
    Ok(())
}

pub fn check_reject(
    proposal_status: ProposalStatus,
    project_client_id: DbId,
    actor: &Actor,
) -> Result<(), CoreError> {
    if actor.user_id != project_client_id {
        return Err(CoreError::forbidden(
            "Only the project owner can reject proposals",
        ));
    }
    if proposal_status != ProposalStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "Proposal is {proposal_status}, only pending proposals can be rejected"
        )));
    }
    Ok(())
}

pub fn check_withdraw(
    proposal_status: ProposalStatus,
    freelancer_id: DbId,
    actor: &Actor,
) -> Result<(), CoreError> {
    if actor.user_id != freelancer_id {
        return Err(CoreError::forbidden(
            "Only the submitting freelancer can withdraw a proposal",
        ));
    }
    if proposal_status != ProposalStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "Proposal is {proposal_status}, only pending proposals can be withdrawn"
        )));
    }
    Ok(())
}

/// Permanent removal. An accepted proposal backs a contract and stays.
pub fn check_delete(
    proposal_status: ProposalStatus,
    freelancer_id: DbId,
    actor: &Actor,
) -> Result<(), CoreError> {
    if actor.user_id != freelancer_id {
        return Err(CoreError::forbidden(
            "Only the submitting freelancer can delete a proposal",
        ));
    }
    if proposal_status == ProposalStatus::Accepted {
        return Err(CoreError::invalid_state(
            "Accepted proposals cannot be deleted",
        ));
    }
    Ok(())
}

/// Whether a proposal in this status counts toward `projects.proposal_count`.
pub fn counts_toward_total(status: ProposalStatus) -> bool {
    status != ProposalStatus::Withdrawn
}
