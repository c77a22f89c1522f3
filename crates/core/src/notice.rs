//! Notices emitted by engine operations for the notification sink.
//!
//! Operations return the notices they produce instead of delivering them;
//! the caller hands them to the sink only after the transaction commits.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ProposalReceived,
    ProposalAccepted,
    ProposalRejected,
    ContractCreated,
    MilestoneSubmitted,
    MilestoneApproved,
    MilestoneRevisionRequested,
    MilestonePaid,
    ContractCompleted,
    ContractCancelled,
    ContractResumed,
    DisputeOpened,
    DisputeMessage,
    DisputeUnderReview,
    DisputeClosed,
    ReviewReceived,
    WithdrawalSettled,
    ApplicationReceived,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::ProposalReceived => "proposal_received",
            NoticeKind::ProposalAccepted => "proposal_accepted",
            NoticeKind::ProposalRejected => "proposal_rejected",
            NoticeKind::ContractCreated => "contract_created",
            NoticeKind::MilestoneSubmitted => "milestone_submitted",
            NoticeKind::MilestoneApproved => "milestone_approved",
            NoticeKind::MilestoneRevisionRequested => "milestone_revision_requested",
            NoticeKind::MilestonePaid => "milestone_paid",
            NoticeKind::ContractCompleted => "contract_completed",
            NoticeKind::ContractCancelled => "contract_cancelled",
            NoticeKind::ContractResumed => "contract_resumed",
            NoticeKind::DisputeOpened => "dispute_opened",
            NoticeKind::DisputeMessage => "dispute_message",
            NoticeKind::DisputeUnderReview => "dispute_under_review",
            NoticeKind::DisputeClosed => "dispute_closed",
            NoticeKind::ReviewReceived => "review_received",
            NoticeKind::WithdrawalSettled => "withdrawal_settled",
            NoticeKind::ApplicationReceived => "application_received",
        }
    }
}

/// A single message for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub recipient_id: DbId,
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
    pub link: String,
}

impl Notice {
    pub fn new(
        recipient_id: DbId,
        kind: NoticeKind,
        title: impl Into<String>,
        body: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            kind,
            title: title.into(),
            body: body.into(),
            link: link.into(),
        }
    }
}

pub fn project_link(project_id: DbId) -> String {
    format!("/projects/{project_id}")
}

pub fn contract_link(contract_id: DbId) -> String {
    format!("/contracts/{contract_id}")
}

pub fn dispute_link(dispute_id: DbId) -> String {
    format!("/disputes/{dispute_id}")
}

pub fn wallet_link() -> String {
    "/wallet".to_string()
}

pub fn job_link(job_id: DbId) -> String {
    format!("/jobs/{job_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_label_matches_serde() {
        let json = serde_json::to_string(&NoticeKind::MilestoneRevisionRequested).unwrap();
        assert_eq!(json, format!("\"{}\"", NoticeKind::MilestoneRevisionRequested.as_str()));
    }

    #[test]
    fn links_are_rooted_paths() {
        assert_eq!(contract_link(7), "/contracts/7");
        assert_eq!(dispute_link(3), "/disputes/3");
    }
}
