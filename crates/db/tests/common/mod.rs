//! Fixtures shared by the repository integration tests.
#![allow(dead_code)]

use gigboard_core::milestone::{MilestoneAction, MilestoneDraft};
use gigboard_core::roles::{Actor, ROLE_ADMIN, ROLE_CLIENT, ROLE_FREELANCER};
use gigboard_core::status::EstimatedDuration;
use gigboard_core::types::Cents;
use gigboard_db::models::contract::{ContractView, CreateContract};
use gigboard_db::models::project::{CreateProject, Project};
use gigboard_db::models::proposal::{CreateProposal, Proposal};
use gigboard_db::models::user::CreateUser;
use gigboard_db::repositories::{ContractRepo, ProjectRepo, ProposalRepo, UserRepo};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, role: &str, name: &str) -> Actor {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{name}@example.com"),
            display_name: name.to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
    Actor::new(user.id, user.role)
}

pub async fn client(pool: &PgPool, name: &str) -> Actor {
    user(pool, ROLE_CLIENT, name).await
}

pub async fn freelancer(pool: &PgPool, name: &str) -> Actor {
    user(pool, ROLE_FREELANCER, name).await
}

pub async fn admin(pool: &PgPool, name: &str) -> Actor {
    user(pool, ROLE_ADMIN, name).await
}

pub fn new_project(title: &str) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        description: "Build the thing".to_string(),
        category: Some("web".to_string()),
        skills: vec!["rust".to_string()],
        budget_min: 10_000,
        budget_max: 100_000,
        budget_type: None,
    }
}

pub async fn project(pool: &PgPool, owner: &Actor, title: &str) -> Project {
    ProjectRepo::create(pool, owner, &new_project(title))
        .await
        .unwrap()
}

pub fn new_proposal(bid: Cents) -> CreateProposal {
    CreateProposal {
        cover_letter: "I can do this".to_string(),
        bid_amount: bid,
        estimated_duration: EstimatedDuration::OneToTwoWeeks,
        attachments: Vec::new(),
    }
}

pub async fn proposal(pool: &PgPool, project_id: i64, bidder: &Actor, bid: Cents) -> Proposal {
    ProposalRepo::submit(pool, project_id, bidder, &new_proposal(bid))
        .await
        .unwrap()
        .value
}

pub fn draft(title: &str, amount: Cents) -> MilestoneDraft {
    MilestoneDraft {
        title: title.to_string(),
        description: None,
        amount,
        due_date: None,
    }
}

/// An ACTIVE contract between a fresh client and freelancer.
pub struct Engaged {
    pub client: Actor,
    pub freelancer: Actor,
    pub project: Project,
    pub contract: ContractView,
}

pub async fn engaged(pool: &PgPool, amounts: &[Cents]) -> Engaged {
    let client = client(pool, "client").await;
    let freelancer = freelancer(pool, "freelancer").await;
    engage(pool, client, freelancer, "Marketplace site", amounts).await
}

/// Post a project for `client`, accept `freelancer`'s bid and open a
/// contract with one milestone per amount.
pub async fn engage(
    pool: &PgPool,
    client: Actor,
    freelancer: Actor,
    title: &str,
    amounts: &[Cents],
) -> Engaged {
    let project = project(pool, &client, title).await;
    let bid: Cents = amounts.iter().sum();
    let proposal = proposal(pool, project.id, &freelancer, bid).await;
    ProposalRepo::accept(pool, proposal.id, &client).await.unwrap();

    let milestones = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| draft(&format!("Phase {}", i + 1), amount))
        .collect();
    let contract = ContractRepo::create_from_proposal(
        pool,
        proposal.id,
        &client,
        CreateContract {
            milestones: Some(milestones),
        },
    )
    .await
    .unwrap()
    .value;

    let project = ProjectRepo::get(pool, project.id).await.unwrap();
    Engaged {
        client,
        freelancer,
        project,
        contract,
    }
}

/// Drive every milestone through submit and approve, leaving each one
/// ready to pay.
pub async fn approve_all(pool: &PgPool, e: &Engaged) {
    let id = e.contract.contract.id;
    for seq in 1..=e.contract.contract.milestones.0.len() as i32 {
        ContractRepo::transition_milestone(
            pool,
            id,
            seq,
            &e.freelancer,
            MilestoneAction::Submit {
                deliverables: Vec::new(),
            },
        )
        .await
        .unwrap();
        ContractRepo::transition_milestone(pool, id, seq, &e.client, MilestoneAction::Approve)
            .await
            .unwrap();
    }
}
