//! Contract aggregate: creation rules, milestone transitions, and
//! completion detection.
//!
//! [`Engagement`] is the in-memory form of one locked contract row. The
//! persistence layer loads it `FOR UPDATE`, calls into it, and writes back
//! whatever it mutated. Everything a transition implies for other
//! aggregates (earnings, project status, freelancer counters) is reported
//! back in [`MilestoneTransition`] rather than performed here.

use crate::error::CoreError;
use crate::milestone::{
    self, all_paid, next_seq, ContractParty, Milestone, MilestoneAction, MilestoneDraft,
    DEFAULT_MILESTONE_TITLE,
};
use crate::notice::{contract_link, Notice, NoticeKind};
use crate::roles::Actor;
use crate::status::{ContractStatus, ProposalStatus};
use crate::types::{Cents, DbId, Timestamp};

/// Which party `user_id` is on this contract, if any.
pub fn party_of(client_id: DbId, freelancer_id: DbId, user_id: DbId) -> Option<ContractParty> {
    if user_id == client_id {
        Some(ContractParty::Client)
    } else if user_id == freelancer_id {
        Some(ContractParty::Freelancer)
    } else {
        None
    }
}

/// Only the two parties and administrators may see a contract.
pub fn ensure_can_view(client_id: DbId, freelancer_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.is_admin() || party_of(client_id, freelancer_id, actor.user_id).is_some() {
        Ok(())
    } else {
        Err(CoreError::forbidden("Not a party to this contract"))
    }
}

/// Rules for `createFromProposal`. The proposal's existence is checked by
/// the caller (it owns the `NotFound`).
pub fn check_create(
    proposal_status: ProposalStatus,
    project_client_id: DbId,
    actor: &Actor,
    contract_exists: bool,
) -> Result<(), CoreError> {
    if proposal_status != ProposalStatus::Accepted {
        return Err(CoreError::invalid_state(format!(
            "Proposal is {proposal_status}; a contract needs an accepted proposal"
        )));
    }
    if actor.user_id != project_client_id {
        return Err(CoreError::forbidden(
            "Only the project owner can create the contract",
        ));
    }
    if contract_exists {
        return Err(CoreError::conflict(
            "A contract already exists for this proposal",
        ));
    }
    Ok(())
}

/// Build the initial milestone list: the caller's drafts, or one milestone
/// covering the whole amount when none are supplied.
pub fn initial_milestones(
    drafts: Option<Vec<MilestoneDraft>>,
    total_amount: Cents,
    description: Option<String>,
) -> Result<Vec<Milestone>, CoreError> {
    let drafts = match drafts {
        Some(list) if !list.is_empty() => list,
        _ => vec![MilestoneDraft {
            title: DEFAULT_MILESTONE_TITLE.to_string(),
            description,
            amount: total_amount,
            due_date: None,
        }],
    };
    for draft in &drafts {
        draft.validate()?;
    }
    Ok(drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| Milestone::from_draft(i as i32 + 1, d))
        .collect())
}

/// Result of a successful milestone transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneTransition {
    /// The milestone as it is after the transition.
    pub milestone: Milestone,
    /// Amount to credit to the freelancer when the milestone was paid.
    pub earned: Option<Cents>,
    /// Whether this transition completed the contract.
    pub completed: bool,
    pub notices: Vec<Notice>,
}

/// One contract, as locked for mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engagement {
    pub id: DbId,
    pub project_id: DbId,
    pub client_id: DbId,
    pub freelancer_id: DbId,
    pub title: String,
    pub status: ContractStatus,
    pub milestones: Vec<Milestone>,
    pub end_date: Option<Timestamp>,
}

impl Engagement {
    pub fn progress(&self) -> u8 {
        milestone::progress(&self.milestones)
    }

    pub fn party(&self, actor: &Actor) -> Option<ContractParty> {
        party_of(self.client_id, self.freelancer_id, actor.user_id)
    }

    /// The party on the other side of `user_id`.
    pub fn counterparty(&self, user_id: DbId) -> Option<DbId> {
        match party_of(self.client_id, self.freelancer_id, user_id)? {
            ContractParty::Client => Some(self.freelancer_id),
            ContractParty::Freelancer => Some(self.client_id),
        }
    }

    fn ensure_active(&self, action: &str) -> Result<(), CoreError> {
        if self.status == ContractStatus::Active {
            Ok(())
        } else {
            Err(CoreError::invalid_state(format!(
                "Cannot {action} while the contract is {}",
                self.status
            )))
        }
    }

    /// Apply a milestone transition on behalf of `actor`.
    ///
    /// On error nothing is mutated. On success the completion check runs
    /// before returning.
    pub fn apply(
        &mut self,
        seq: i32,
        actor: &Actor,
        action: MilestoneAction,
        now: Timestamp,
    ) -> Result<MilestoneTransition, CoreError> {
        let party = self
            .party(actor)
            .ok_or_else(|| CoreError::forbidden("Not a party to this contract"))?;
        let required = action.required_party();
        if party != required {
            return Err(CoreError::forbidden(format!(
                "Only the {} can {} a milestone",
                match required {
                    ContractParty::Client => "client",
                    ContractParty::Freelancer => "freelancer",
                },
                action.name()
            )));
        }
        self.ensure_active(action.name())?;
        action.validate()?;

        let contract_id = self.id;
        let title = self.title.clone();
        let (client_id, freelancer_id) = (self.client_id, self.freelancer_id);
        let m = self
            .milestones
            .iter_mut()
            .find(|m| m.seq == seq)
            .ok_or(CoreError::NotFound {
                entity: "Milestone",
                id: DbId::from(seq),
            })?;

        let paying = matches!(action, MilestoneAction::Pay);
        let notice = match &action {
            MilestoneAction::Submit { .. } => Notice::new(
                client_id,
                NoticeKind::MilestoneSubmitted,
                "Milestone submitted",
                format!("'{}' on '{title}' is ready for review", m.title),
                contract_link(contract_id),
            ),
            MilestoneAction::Approve => Notice::new(
                freelancer_id,
                NoticeKind::MilestoneApproved,
                "Milestone approved",
                format!("'{}' on '{title}' was approved", m.title),
                contract_link(contract_id),
            ),
            MilestoneAction::RequestRevision { .. } => Notice::new(
                freelancer_id,
                NoticeKind::MilestoneRevisionRequested,
                "Revision requested",
                format!("The client asked for changes to '{}' on '{title}'", m.title),
                contract_link(contract_id),
            ),
            MilestoneAction::Pay => Notice::new(
                freelancer_id,
                NoticeKind::MilestonePaid,
                "Milestone paid",
                format!("'{}' on '{title}' was paid ({} cents)", m.title, m.amount),
                contract_link(contract_id),
            ),
        };

        milestone::transition(m, action, now)?;
        let snapshot = m.clone();

        let mut notices = vec![notice];
        let completed = self.complete_if_done(now);
        if completed {
            notices.extend(self.completion_notices());
        }

        Ok(MilestoneTransition {
            earned: paying.then_some(snapshot.amount),
            milestone: snapshot,
            completed,
            notices,
        })
    }

    /// Append a milestone. Client only, and only while ACTIVE.
    pub fn add_milestone(
        &mut self,
        actor: &Actor,
        draft: MilestoneDraft,
    ) -> Result<Milestone, CoreError> {
        if self.party(actor) != Some(ContractParty::Client) {
            return Err(CoreError::forbidden("Only the client can add milestones"));
        }
        self.ensure_active("add a milestone")?;
        draft.validate()?;
        let m = Milestone::from_draft(next_seq(&self.milestones), draft);
        self.milestones.push(m.clone());
        Ok(m)
    }

    /// Completion check. Returns `true` only on the call that performs the
    /// ACTIVE -> COMPLETED transition; any later call is a no-op.
    pub fn complete_if_done(&mut self, now: Timestamp) -> bool {
        if self.status != ContractStatus::Active || !all_paid(&self.milestones) {
            return false;
        }
        self.status = ContractStatus::Completed;
        self.end_date = Some(now);
        true
    }

    pub fn completion_notices(&self) -> Vec<Notice> {
        [self.client_id, self.freelancer_id]
            .into_iter()
            .map(|recipient| {
                Notice::new(
                    recipient,
                    NoticeKind::ContractCompleted,
                    "Contract completed",
                    format!("All milestones on '{}' are paid", self.title),
                    contract_link(self.id),
                )
            })
            .collect()
    }

    /// Sum of all milestone amounts that reached PAID.
    pub fn paid_total(&self) -> Cents {
        self.milestones
            .iter()
            .filter(|m| m.status == crate::status::MilestoneStatus::Paid)
            .map(|m| m.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::attachment::Attachment;
    use crate::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_FREELANCER};
    use crate::status::MilestoneStatus;

    const CLIENT: DbId = 1;
    const FREELANCER: DbId = 2;

    fn client() -> Actor {
        Actor::new(CLIENT, ROLE_CLIENT)
    }

    fn freelancer() -> Actor {
        Actor::new(FREELANCER, ROLE_FREELANCER)
    }

    fn draft(title: &str, amount: Cents) -> MilestoneDraft {
        MilestoneDraft {
            title: title.to_string(),
            description: None,
            amount,
            due_date: None,
        }
    }

    fn engagement(amounts: &[Cents]) -> Engagement {
        let drafts = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| draft(&format!("Part {}", i + 1), *a))
            .collect();
        Engagement {
            id: 100,
            project_id: 50,
            client_id: CLIENT,
            freelancer_id: FREELANCER,
            title: "Website".into(),
            status: ContractStatus::Active,
            milestones: initial_milestones(Some(drafts), amounts.iter().sum(), None).unwrap(),
            end_date: None,
        }
    }

    fn submit() -> MilestoneAction {
        MilestoneAction::Submit {
            deliverables: vec![Attachment::new("build.zip", "https://files.example/build.zip")],
        }
    }

    fn run_to_paid(e: &mut Engagement, seq: i32) -> Vec<MilestoneTransition> {
        let now = chrono::Utc::now();
        vec![
            e.apply(seq, &freelancer(), submit(), now).unwrap(),
            e.apply(seq, &client(), MilestoneAction::Approve, now).unwrap(),
            e.apply(seq, &client(), MilestoneAction::Pay, now).unwrap(),
        ]
    }

    #[test]
    fn default_milestone_covers_full_amount() {
        let list = initial_milestones(None, 50_000, None).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].amount, 50_000);
        assert_eq!(list[0].seq, 1);
        assert_eq!(list[0].title, DEFAULT_MILESTONE_TITLE);
    }

    #[test]
    fn empty_draft_list_falls_back_to_default() {
        let list = initial_milestones(Some(vec![]), 700, None).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].amount, 700);
    }

    #[test]
    fn create_requires_accepted_proposal() {
        assert_matches!(
            check_create(ProposalStatus::Pending, CLIENT, &client(), false),
            Err(CoreError::InvalidState(_))
        );
        assert_matches!(
            check_create(ProposalStatus::Accepted, CLIENT, &freelancer(), false),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            check_create(ProposalStatus::Accepted, CLIENT, &client(), true),
            Err(CoreError::Conflict(_))
        );
        assert!(check_create(ProposalStatus::Accepted, CLIENT, &client(), false).is_ok());
    }

    #[test]
    fn two_milestones_paid_completes_contract() {
        let mut e = engagement(&[200, 300]);
        let first = run_to_paid(&mut e, 1);
        assert!(first.iter().all(|t| !t.completed));
        assert_eq!(e.status, ContractStatus::Active);

        let second = run_to_paid(&mut e, 2);
        let last = second.last().unwrap();
        assert!(last.completed);
        assert_eq!(e.status, ContractStatus::Completed);
        assert!(e.end_date.is_some());
        assert_eq!(e.progress(), 100);

        let earned: Cents = first
            .iter()
            .chain(second.iter())
            .filter_map(|t| t.earned)
            .sum();
        assert_eq!(earned, 500);
        assert_eq!(e.paid_total(), 500);
    }

    #[test]
    fn completion_notifies_both_parties() {
        let mut e = engagement(&[100]);
        let transitions = run_to_paid(&mut e, 1);
        let recipients: Vec<DbId> = transitions
            .last()
            .unwrap()
            .notices
            .iter()
            .filter(|n| n.kind == NoticeKind::ContractCompleted)
            .map(|n| n.recipient_id)
            .collect();
        assert_eq!(recipients, vec![CLIENT, FREELANCER]);
    }

    #[test]
    fn completion_check_is_idempotent() {
        let mut e = engagement(&[100]);
        run_to_paid(&mut e, 1);
        let end = e.end_date;
        assert!(!e.complete_if_done(chrono::Utc::now()));
        assert!(!e.complete_if_done(chrono::Utc::now()));
        assert_eq!(e.status, ContractStatus::Completed);
        assert_eq!(e.end_date, end);
    }

    #[test]
    fn wrong_party_is_forbidden_and_leaves_state() {
        let mut e = engagement(&[100]);
        let before = e.clone();
        assert_matches!(
            e.apply(1, &client(), submit(), chrono::Utc::now()),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            e.apply(1, &freelancer(), MilestoneAction::Approve, chrono::Utc::now()),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            e.apply(1, &Actor::new(99, ROLE_ADMIN), MilestoneAction::Pay, chrono::Utc::now()),
            Err(CoreError::Forbidden(_))
        );
        assert_eq!(e, before);
    }

    #[test]
    fn wrong_source_state_is_invalid_state() {
        let mut e = engagement(&[100]);
        assert_matches!(
            e.apply(1, &client(), MilestoneAction::Pay, chrono::Utc::now()),
            Err(CoreError::InvalidState(_))
        );
        assert_eq!(e.milestones[0].status, MilestoneStatus::Pending);
    }

    #[test]
    fn disputed_contract_freezes_milestones() {
        let mut e = engagement(&[100]);
        e.status = ContractStatus::Disputed;
        assert_matches!(
            e.apply(1, &freelancer(), submit(), chrono::Utc::now()),
            Err(CoreError::InvalidState(_))
        );
        assert_eq!(e.milestones[0].status, MilestoneStatus::Pending);
    }

    #[test]
    fn unknown_milestone_is_not_found() {
        let mut e = engagement(&[100]);
        assert_matches!(
            e.apply(9, &freelancer(), submit(), chrono::Utc::now()),
            Err(CoreError::NotFound { entity: "Milestone", id: 9 })
        );
    }

    #[test]
    fn progress_never_decreases_across_lifecycle() {
        let mut e = engagement(&[100, 100, 100]);
        let now = chrono::Utc::now();
        let mut last = e.progress();
        let steps: Vec<(i32, Actor, MilestoneAction)> = vec![
            (1, freelancer(), submit()),
            (1, client(), MilestoneAction::RequestRevision { feedback: Some("Fix colours".into()) }),
            (1, freelancer(), submit()),
            (1, client(), MilestoneAction::Approve),
            (2, freelancer(), submit()),
            (1, client(), MilestoneAction::Pay),
            (2, client(), MilestoneAction::Approve),
            (3, freelancer(), submit()),
            (3, client(), MilestoneAction::Approve),
            (2, client(), MilestoneAction::Pay),
            (3, client(), MilestoneAction::Pay),
        ];
        for (seq, actor, action) in steps {
            e.apply(seq, &actor, action, now).unwrap();
            let p = e.progress();
            assert!(p >= last, "progress went from {last} to {p}");
            last = p;
        }
        assert_eq!(e.status, ContractStatus::Completed);
    }

    #[test]
    fn add_milestone_is_client_only_and_active_only() {
        let mut e = engagement(&[100]);
        assert_matches!(
            e.add_milestone(&freelancer(), draft("Extra", 50)),
            Err(CoreError::Forbidden(_))
        );
        let m = e.add_milestone(&client(), draft("Extra", 50)).unwrap();
        assert_eq!(m.seq, 2);
        assert_eq!(e.milestones.len(), 2);

        e.status = ContractStatus::Completed;
        assert_matches!(
            e.add_milestone(&client(), draft("Late", 50)),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn counterparty_resolves_other_side() {
        let e = engagement(&[100]);
        assert_eq!(e.counterparty(CLIENT), Some(FREELANCER));
        assert_eq!(e.counterparty(FREELANCER), Some(CLIENT));
        assert_eq!(e.counterparty(42), None);
    }
}
