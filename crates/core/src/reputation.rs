//! Review rules and the arithmetic behind freelancer reputation fields.
//!
//! `rating` and `total_reviews` are always recomputed from the full set of
//! a freelancer's reviews, never adjusted incrementally.

use crate::error::CoreError;
use crate::roles::Actor;
use crate::status::ContractStatus;
use crate::types::DbId;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Maximum length for a review comment.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::invalid_argument(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::invalid_argument(format!(
            "Comment exceeds {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Round to one decimal place, half away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of `ratings` rounded to one decimal; 0.0 with no reviews.
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    round_one_decimal(sum as f64 / ratings.len() as f64)
}

/// Share of finished contracts that completed, as a percentage with one
/// decimal. Contracts still running do not count either way.
pub fn success_rate(completed: i64, cancelled: i64) -> f64 {
    let finished = completed + cancelled;
    if finished <= 0 {
        return 0.0;
    }
    round_one_decimal(completed as f64 * 100.0 / finished as f64)
}

/// Rules for reviewing the freelancer on a contract.
pub fn check_submit(
    client_id: DbId,
    contract_status: ContractStatus,
    actor: &Actor,
    already_reviewed: bool,
) -> Result<(), CoreError> {
    if actor.user_id != client_id {
        return Err(CoreError::forbidden(
            "Only the contract's client can review the freelancer",
        ));
    }
    if contract_status != ContractStatus::Completed {
        return Err(CoreError::invalid_state(format!(
            "Contract is {contract_status}; reviews open once it is completed"
        )));
    }
    if already_reviewed {
        return Err(CoreError::conflict(
            "This contract has already been reviewed",
        ));
    }
    Ok(())
}

pub fn check_update(reviewer_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.user_id != reviewer_id {
        return Err(CoreError::forbidden("Only the author can edit a review"));
    }
    Ok(())
}

pub fn check_delete(reviewer_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.user_id != reviewer_id && !actor.is_admin() {
        return Err(CoreError::forbidden(
            "Only the author or an administrator can delete a review",
        ));
    }
    Ok(())
}
