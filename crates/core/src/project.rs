//! Project posting validation and owner-side lifecycle rules.

use crate::error::CoreError;
use crate::roles::Actor;
use crate::status::ProjectStatus;
use crate::types::{Cents, DbId};

/// Maximum length for a project title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a project description.
pub const MAX_DESCRIPTION_LENGTH: usize = 20_000;

/// Maximum number of skill tags on a project.
pub const MAX_SKILLS: usize = 20;

/// Validate a project or job title: non-blank and bounded.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::invalid_argument("Title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::invalid_argument(format!(
            "Title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::invalid_argument(format!(
            "Description exceeds {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a budget range. Both bounds must be positive and ordered.
pub fn validate_budget(min: Cents, max: Cents) -> Result<(), CoreError> {
    if min <= 0 || max <= 0 {
        return Err(CoreError::invalid_argument(
            "Budget bounds must be greater than zero",
        ));
    }
    if min > max {
        return Err(CoreError::invalid_argument(format!(
            "Budget minimum ({min}) exceeds maximum ({max})"
        )));
    }
    Ok(())
}

pub fn validate_skills(skills: &[String]) -> Result<(), CoreError> {
    if skills.len() > MAX_SKILLS {
        return Err(CoreError::invalid_argument(format!(
            "At most {MAX_SKILLS} skills are allowed"
        )));
    }
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err(CoreError::invalid_argument("Skill tags must not be blank"));
    }
    Ok(())
}

/// Only clients (and administrators) post projects.
pub fn ensure_can_post(actor: &Actor) -> Result<(), CoreError> {
    if actor.is_client() || actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::forbidden("Only clients can post projects"))
    }
}

/// Owner-only mutations. Administrators are not owners.
pub fn ensure_owner(client_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.user_id == client_id {
        Ok(())
    } else {
        Err(CoreError::forbidden("Only the project owner can do this"))
    }
}

/// Owner edits, cancellation, and deletion are only valid while OPEN.
pub fn ensure_open(status: ProjectStatus, action: &str) -> Result<(), CoreError> {
    if status == ProjectStatus::Open {
        Ok(())
    } else {
        Err(CoreError::invalid_state(format!(
            "Cannot {action} a project that is {status}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_CLIENT, ROLE_FREELANCER};

    #[test]
    fn blank_title_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Logo design").is_ok());
    }

    #[test]
    fn inverted_budget_rejected() {
        assert!(validate_budget(500, 100).is_err());
        assert!(validate_budget(0, 100).is_err());
        assert!(validate_budget(100, 100).is_ok());
    }

    #[test]
    fn freelancers_cannot_post() {
        assert!(ensure_can_post(&Actor::new(1, ROLE_FREELANCER)).is_err());
        assert!(ensure_can_post(&Actor::new(1, ROLE_CLIENT)).is_ok());
    }

    #[test]
    fn closed_projects_are_immutable() {
        let err = ensure_open(ProjectStatus::InProgress, "delete").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidState("Cannot delete a project that is in_progress".into())
        );
    }
}
