//! Milestone values and the milestone state machine.
//!
//! Milestones have no identity outside their contract: `seq` is unique only
//! within one contract and the whole list is persisted with the contract row.

use serde::{Deserialize, Serialize};

use crate::attachment::{validate_attachments, Attachment};
use crate::error::CoreError;
use crate::project::validate_title;
use crate::status::MilestoneStatus;
use crate::types::{Cents, Timestamp};

/// Title used for the milestone created when the client supplies none.
pub const DEFAULT_MILESTONE_TITLE: &str = "Project delivery";

/// Maximum length for revision feedback.
pub const MAX_FEEDBACK_LENGTH: usize = 5_000;

/// One unit of deliverable work inside a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub seq: i32,
    pub title: String,
    pub description: Option<String>,
    pub amount: Cents,
    pub due_date: Option<Timestamp>,
    pub status: MilestoneStatus,
    #[serde(default)]
    pub deliverables: Vec<Attachment>,
    pub feedback: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
}

/// Caller-supplied milestone definition (contract creation, `addMilestone`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: Option<String>,
    pub amount: Cents,
    pub due_date: Option<Timestamp>,
}

impl MilestoneDraft {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        if self.amount <= 0 {
            return Err(CoreError::invalid_argument(format!(
                "Milestone '{}' amount must be greater than zero",
                self.title
            )));
        }
        Ok(())
    }
}

impl Milestone {
    pub fn from_draft(seq: i32, draft: MilestoneDraft) -> Self {
        Self {
            seq,
            title: draft.title,
            description: draft.description,
            amount: draft.amount,
            due_date: draft.due_date,
            status: MilestoneStatus::Pending,
            deliverables: Vec::new(),
            feedback: None,
            submitted_at: None,
            approved_at: None,
            paid_at: None,
        }
    }

    /// Approved and paid milestones count toward progress.
    pub fn is_done(&self) -> bool {
        matches!(
            self.status,
            MilestoneStatus::Approved | MilestoneStatus::Paid
        )
    }
}

/// Which side of the contract performs an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractParty {
    Client,
    Freelancer,
}

/// A requested milestone transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MilestoneAction {
    Submit { deliverables: Vec<Attachment> },
    Approve,
    RequestRevision { feedback: Option<String> },
    Pay,
}

impl MilestoneAction {
    pub fn name(&self) -> &'static str {
        match self {
            MilestoneAction::Submit { .. } => "submit",
            MilestoneAction::Approve => "approve",
            MilestoneAction::RequestRevision { .. } => "request_revision",
            MilestoneAction::Pay => "pay",
        }
    }

    pub fn target(&self) -> MilestoneStatus {
        match self {
            MilestoneAction::Submit { .. } => MilestoneStatus::Submitted,
            MilestoneAction::Approve => MilestoneStatus::Approved,
            MilestoneAction::RequestRevision { .. } => MilestoneStatus::RevisionRequested,
            MilestoneAction::Pay => MilestoneStatus::Paid,
        }
    }

    /// The freelancer submits; everything else belongs to the client.
    pub fn required_party(&self) -> ContractParty {
        match self {
            MilestoneAction::Submit { .. } => ContractParty::Freelancer,
            _ => ContractParty::Client,
        }
    }

    pub fn allowed_from(&self) -> &'static [MilestoneStatus] {
        match self {
            MilestoneAction::Submit { .. } => &[
                MilestoneStatus::Pending,
                MilestoneStatus::InProgress,
                MilestoneStatus::RevisionRequested,
            ],
            MilestoneAction::Approve | MilestoneAction::RequestRevision { .. } => {
                &[MilestoneStatus::Submitted]
            }
            MilestoneAction::Pay => &[MilestoneStatus::Approved],
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            MilestoneAction::Submit { deliverables } => validate_attachments(deliverables),
            MilestoneAction::RequestRevision {
                feedback: Some(text),
            } if text.chars().count() > MAX_FEEDBACK_LENGTH => {
                Err(CoreError::invalid_argument(format!(
                    "Feedback exceeds {MAX_FEEDBACK_LENGTH} characters"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Move a single milestone through `action`, checking only the source state.
///
/// Actor and contract-status checks belong to the contract; see
/// [`crate::contract::Engagement::apply`].
pub fn transition(
    milestone: &mut Milestone,
    action: MilestoneAction,
    now: Timestamp,
) -> Result<(), CoreError> {
    if !action.allowed_from().contains(&milestone.status) {
        return Err(CoreError::invalid_state(format!(
            "Cannot {} milestone {} while it is {}",
            action.name(),
            milestone.seq,
            milestone.status
        )));
    }
    milestone.status = action.target();
    match action {
        MilestoneAction::Submit { deliverables } => {
            milestone.deliverables.extend(deliverables);
            milestone.submitted_at = Some(now);
        }
        MilestoneAction::Approve => {
            milestone.approved_at = Some(now);
            milestone.feedback = None;
        }
        MilestoneAction::RequestRevision { feedback } => {
            milestone.feedback = feedback;
        }
        MilestoneAction::Pay => {
            milestone.paid_at = Some(now);
        }
    }
    Ok(())
}

/// Percentage of milestones that are approved or paid, rounded half-up.
/// Zero when there are no milestones.
pub fn progress(milestones: &[Milestone]) -> u8 {
    let total = milestones.len();
    if total == 0 {
        return 0;
    }
    let done = milestones.iter().filter(|m| m.is_done()).count();
    ((done * 100 + total / 2) / total) as u8
}

/// True only for a non-empty list where every milestone is PAID.
pub fn all_paid(milestones: &[Milestone]) -> bool {
    !milestones.is_empty() && milestones.iter().all(|m| m.status == MilestoneStatus::Paid)
}

/// Next free `seq` within one contract.
pub fn next_seq(milestones: &[Milestone]) -> i32 {
    milestones.iter().map(|m| m.seq).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn milestone(seq: i32, status: MilestoneStatus) -> Milestone {
        let mut m = Milestone::from_draft(
            seq,
            MilestoneDraft {
                title: format!("Milestone {seq}"),
                description: None,
                amount: 100,
                due_date: None,
            },
        );
        m.status = status;
        m
    }

    #[test]
    fn progress_is_zero_without_milestones() {
        assert_eq!(progress(&[]), 0);
    }

    #[test]
    fn progress_counts_approved_and_paid() {
        let list = vec![
            milestone(1, MilestoneStatus::Paid),
            milestone(2, MilestoneStatus::Approved),
            milestone(3, MilestoneStatus::Submitted),
        ];
        // 2 / 3 = 66.67 -> 67
        assert_eq!(progress(&list), 67);
    }

    #[test]
    fn progress_rounds_to_nearest() {
        let list = vec![
            milestone(1, MilestoneStatus::Paid),
            milestone(2, MilestoneStatus::Pending),
            milestone(3, MilestoneStatus::Pending),
        ];
        assert_eq!(progress(&list), 33);
        let halves = vec![
            milestone(1, MilestoneStatus::Paid),
            milestone(2, MilestoneStatus::Pending),
        ];
        assert_eq!(progress(&halves), 50);
    }

    #[test]
    fn submit_from_revision_requested_is_allowed() {
        let now = chrono::Utc::now();
        let mut m = milestone(1, MilestoneStatus::RevisionRequested);
        transition(
            &mut m,
            MilestoneAction::Submit {
                deliverables: vec![Attachment::new("v2.zip", "https://files.example/v2.zip")],
            },
            now,
        )
        .unwrap();
        assert_eq!(m.status, MilestoneStatus::Submitted);
        assert_eq!(m.submitted_at, Some(now));
        assert_eq!(m.deliverables.len(), 1);
    }

    #[test]
    fn approve_requires_submitted() {
        let mut m = milestone(1, MilestoneStatus::Pending);
        assert_matches!(
            transition(&mut m, MilestoneAction::Approve, chrono::Utc::now()),
            Err(CoreError::InvalidState(_))
        );
        assert_eq!(m.status, MilestoneStatus::Pending);
    }

    #[test]
    fn pay_requires_approved() {
        let mut m = milestone(1, MilestoneStatus::Submitted);
        assert!(transition(&mut m, MilestoneAction::Pay, chrono::Utc::now()).is_err());
        let mut m = milestone(1, MilestoneStatus::Approved);
        assert!(transition(&mut m, MilestoneAction::Pay, chrono::Utc::now()).is_ok());
        assert!(m.paid_at.is_some());
    }

    #[test]
    fn approved_and_paid_never_move_backwards() {
        for status in [MilestoneStatus::Approved, MilestoneStatus::Paid] {
            let mut m = milestone(1, status);
            assert!(transition(
                &mut m,
                MilestoneAction::RequestRevision { feedback: None },
                chrono::Utc::now()
            )
            .is_err());
            assert!(transition(
                &mut m,
                MilestoneAction::Submit {
                    deliverables: vec![]
                },
                chrono::Utc::now()
            )
            .is_err());
        }
    }

    #[test]
    fn all_paid_requires_non_empty() {
        assert!(!all_paid(&[]));
        assert!(all_paid(&[milestone(1, MilestoneStatus::Paid)]));
        assert!(!all_paid(&[
            milestone(1, MilestoneStatus::Paid),
            milestone(2, MilestoneStatus::Approved)
        ]));
    }

    #[test]
    fn next_seq_follows_highest() {
        assert_eq!(next_seq(&[]), 1);
        let list = vec![
            milestone(1, MilestoneStatus::Paid),
            milestone(4, MilestoneStatus::Pending),
        ];
        assert_eq!(next_seq(&list), 5);
    }

    #[test]
    fn draft_amount_must_be_positive() {
        let draft = MilestoneDraft {
            title: "Design".into(),
            description: None,
            amount: 0,
            due_date: None,
        };
        assert_matches!(draft.validate(), Err(CoreError::InvalidArgument(_)));
    }
}
