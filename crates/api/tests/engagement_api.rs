//! The engagement lifecycle driven end to end over HTTP.

mod common;

use axum::http::StatusCode;
use common::{bid, body_json, delete, get, post, post_json, post_project};
use gigboard_core::status::{ContractStatus, ProjectStatus, ProposalStatus};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_full_engagement(pool: PgPool) {
    let app = || common::build_test_app(pool.clone());
    let owner = common::client(&pool, "owner").await;
    let dev = common::freelancer(&pool, "dev").await;
    let rival = common::freelancer(&pool, "rival").await;

    let project_id = post_project(app(), &owner).await;
    let proposal_id = bid(app(), project_id, &dev, 50_000).await;
    let rival_id = bid(app(), project_id, &rival, 45_000).await;

    // Accept one; the other is rejected in the same step.
    let response = post(app(), &format!("/api/v1/proposals/{proposal_id}/accept"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["status_id"],
        ProposalStatus::Accepted.id()
    );

    let response = get(app(), &format!("/api/v1/projects/{project_id}/proposals"), &owner).await;
    let proposals = body_json(response).await["data"].as_array().unwrap().clone();
    let rival_row = proposals.iter().find(|p| p["id"] == rival_id).unwrap();
    assert_eq!(rival_row["status_id"], ProposalStatus::Rejected.id());

    let response = get(app(), &format!("/api/v1/projects/{project_id}"), &owner).await;
    let project = body_json(response).await;
    assert_eq!(project["data"]["status_id"], ProjectStatus::InProgress.id());
    assert_eq!(project["data"]["assigned_freelancer_id"], dev.id);

    // Contract with two milestones.
    let response = post_json(
        app(),
        "/api/v1/contracts",
        &owner,
        json!({
            "proposal_id": proposal_id,
            "milestones": [
                { "title": "Design", "amount": 20_000 },
                { "title": "Build", "amount": 30_000 }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let contract = body_json(response).await;
    let contract_id = contract["data"]["id"].as_i64().unwrap();
    assert_eq!(contract["data"]["progress"], 0);
    assert_eq!(contract["data"]["milestones"][0]["status"], "pending");

    let base = format!("/api/v1/contracts/{contract_id}/milestones");
    for seq in [1, 2] {
        let response = post_json(
            app(),
            &format!("{base}/{seq}/submit"),
            &dev,
            json!({ "deliverables": [{ "name": "work.zip", "url": "https://files.example.com/work.zip" }] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = post(app(), &format!("{base}/{seq}/approve"), &owner).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = post(app(), &format!("{base}/{seq}/pay"), &owner).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(app(), &format!("/api/v1/contracts/{contract_id}"), &dev).await;
    let contract = body_json(response).await;
    assert_eq!(contract["data"]["status_id"], ContractStatus::Completed.id());
    assert_eq!(contract["data"]["progress"], 100);

    let response = get(app(), "/api/v1/wallet", &dev).await;
    assert_eq!(body_json(response).await["data"]["balance"], 50_000);

    let response = get(app(), &format!("/api/v1/freelancers/{}/profile", dev.id), &owner).await;
    let profile = body_json(response).await;
    assert_eq!(profile["data"]["total_earnings"], 50_000);
    assert_eq!(profile["data"]["completed_projects"], 1);
    assert_eq!(profile["data"]["success_rate"], 100.0);

    // Review once; a second review conflicts.
    let review = json!({ "rating": 5, "comment": "Excellent" });
    let response = post_json(
        app(),
        &format!("/api/v1/contracts/{contract_id}/reviews"),
        &owner,
        review.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = post_json(
        app(),
        &format!("/api/v1/contracts/{contract_id}/reviews"),
        &owner,
        review,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(app(), &format!("/api/v1/freelancers/{}/reviews", dev.id), &rival).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rule_violations_map_to_status_codes(pool: PgPool) {
    let app = || common::build_test_app(pool.clone());
    let owner = common::client(&pool, "owner").await;
    let dev = common::freelancer(&pool, "dev").await;
    let project_id = post_project(app(), &owner).await;

    // Owner bidding on their own project.
    let response = post_json(
        app(),
        &format!("/api/v1/projects/{project_id}/proposals"),
        &owner,
        json!({
            "cover_letter": "Me",
            "bid_amount": 1_000,
            "estimated_duration": "less_than_week"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let proposal_id = bid(app(), project_id, &dev, 20_000).await;

    // Duplicate bid.
    let response = post_json(
        app(),
        &format!("/api/v1/projects/{project_id}/proposals"),
        &dev,
        json!({
            "cover_letter": "Again",
            "bid_amount": 25_000,
            "estimated_duration": "less_than_week"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Only the owner sees the bids.
    let response = get(app(), &format!("/api/v1/projects/{project_id}/proposals"), &dev).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Contract before acceptance.
    let response = post_json(
        app(),
        "/api/v1/contracts",
        &owner,
        json!({ "proposal_id": proposal_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    let response = post(app(), &format!("/api/v1/proposals/{proposal_id}/accept"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Accepted proposals cannot be withdrawn or deleted.
    let response = post(app(), &format!("/api/v1/proposals/{proposal_id}/withdraw"), &dev).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response = delete(app(), &format!("/api/v1/proposals/{proposal_id}"), &dev).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The project is no longer OPEN, so it cannot be deleted.
    let response = delete(app(), &format!("/api/v1/projects/{project_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(app(), "/api/v1/projects/999999", &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_wallet_rules(pool: PgPool) {
    let app = || common::build_test_app(pool.clone());
    let owner = common::client(&pool, "owner").await;
    let ops = common::admin(&pool, "ops").await;

    let response = post_json(app(), "/api/v1/wallet/deposit", &owner, json!({ "amount": 50 })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app(),
        "/api/v1/wallet/withdraw",
        &owner,
        json!({ "amount": 100, "method": "paypal" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INSUFFICIENT_FUNDS");

    let response = post_json(
        app(),
        "/api/v1/wallet/withdraw",
        &owner,
        json!({ "amount": 40, "method": "carrier_pigeon" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app(),
        "/api/v1/wallet/withdraw",
        &owner,
        json!({ "amount": 40, "method": "bank_transfer", "details": { "iban": "X" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = body_json(response).await;
    assert_eq!(receipt["data"]["balance"], 10);
    let txn_id = receipt["data"]["transaction"]["id"].as_i64().unwrap();

    let response = post_json(
        app(),
        &format!("/api/v1/admin/withdrawals/{txn_id}/settle"),
        &ops,
        json!({ "succeeded": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["balance"], 50);

    let response = get(app(), "/api/v1/wallet/transactions", &owner).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);
}

/// Deliverables and revision feedback are optional, so both endpoints
/// accept a POST with no body at all.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_milestone_steps_without_body(pool: PgPool) {
    let app = || common::build_test_app(pool.clone());
    let owner = common::client(&pool, "owner").await;
    let dev = common::freelancer(&pool, "dev").await;
    let project_id = post_project(app(), &owner).await;
    let proposal_id = bid(app(), project_id, &dev, 20_000).await;
    let response = post(app(), &format!("/api/v1/proposals/{proposal_id}/accept"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app(),
        "/api/v1/contracts",
        &owner,
        json!({ "proposal_id": proposal_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let contract_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let base = format!("/api/v1/contracts/{contract_id}/milestones/1");

    let response = post(app(), &format!("{base}/submit"), &dev).await;
    assert_eq!(response.status(), StatusCode::OK);
    let contract = body_json(response).await;
    assert_eq!(contract["data"]["milestones"][0]["status"], "submitted");
    assert_eq!(
        contract["data"]["milestones"][0]["deliverables"]
            .as_array()
            .map(Vec::len)
            .unwrap_or(0),
        0
    );

    let response = post(app(), &format!("{base}/request-revision"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["milestones"][0]["status"],
        "revision_requested"
    );
}
