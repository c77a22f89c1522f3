//! Job board postings and applications.

use crate::error::CoreError;
use crate::roles::Actor;
use crate::status::JobStatus;
use crate::types::DbId;

pub fn ensure_can_post(actor: &Actor) -> Result<(), CoreError> {
    if actor.is_client() || actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::forbidden("Only clients can post jobs"))
    }
}

pub fn check_close(status: JobStatus, company_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.user_id != company_id {
        return Err(CoreError::forbidden("Only the job owner can close it"));
    }
    if status != JobStatus::Open {
        return Err(CoreError::invalid_state("Job is already closed"));
    }
    Ok(())
}

/// `already_applied` is whether this applicant has a live application.
pub fn check_apply(
    status: JobStatus,
    company_id: DbId,
    actor: &Actor,
    already_applied: bool,
) -> Result<(), CoreError> {
    if actor.user_id == company_id {
        return Err(CoreError::forbidden("Cannot apply to your own job"));
    }
    if status != JobStatus::Open {
        return Err(CoreError::invalid_state(
            "Job is closed and no longer accepting applications",
        ));
    }
    if already_applied {
        return Err(CoreError::conflict("You have already applied to this job"));
    }
    Ok(())
}

pub fn check_withdraw_application(applicant_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.user_id != applicant_id {
        return Err(CoreError::forbidden(
            "Only the applicant can withdraw an application",
        ));
    }
    Ok(())
}
