mod common;

use assert_matches::assert_matches;
use gigboard_core::attachment::Attachment;
use gigboard_core::error::CoreError;
use gigboard_core::milestone::MilestoneAction;
use gigboard_db::models::review::{CreateReview, UpdateReview};
use gigboard_db::repositories::{ContractRepo, ProfileRepo, ReviewRepo};
use gigboard_db::DbError;
use sqlx::PgPool;

use common::*;

async fn complete(pool: &PgPool, e: &Engaged) {
    let id = e.contract.contract.id;
    ContractRepo::transition_milestone(
        pool,
        id,
        1,
        &e.freelancer,
        MilestoneAction::Submit {
            deliverables: vec![Attachment::new("site.zip", "https://files.example.com/site.zip")],
        },
    )
    .await
    .unwrap();
    ContractRepo::transition_milestone(pool, id, 1, &e.client, MilestoneAction::Approve)
        .await
        .unwrap();
    ContractRepo::transition_milestone(pool, id, 1, &e.client, MilestoneAction::Pay)
        .await
        .unwrap();
}

fn review(rating: i16) -> CreateReview {
    CreateReview {
        rating,
        comment: Some("Great work".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_requires_completed_contract(pool: PgPool) {
    let e = engaged(&pool, &[100]).await;
    let err = ReviewRepo::submit(&pool, e.contract.contract.id, &e.client, &review(5))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::InvalidState(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_recomputed_on_every_write(pool: PgPool) {
    let e = engaged(&pool, &[100]).await;
    complete(&pool, &e).await;
    let id = e.contract.contract.id;

    let err = ReviewRepo::submit(&pool, id, &e.freelancer, &review(5))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Forbidden(_)));

    let created = ReviewRepo::submit(&pool, id, &e.client, &review(4))
        .await
        .unwrap();
    assert_eq!(created.notices[0].recipient_id, e.freelancer.user_id);

    let profile = ProfileRepo::find_by_user(&pool, e.freelancer.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.rating, 4.0);
    assert_eq!(profile.total_reviews, 1);

    let err = ReviewRepo::submit(&pool, id, &e.client, &review(5))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    ReviewRepo::update(
        &pool,
        created.value.id,
        &e.client,
        &UpdateReview {
            rating: Some(2),
            comment: None,
        },
    )
    .await
    .unwrap();
    let profile = ProfileRepo::find_by_user(&pool, e.freelancer.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.rating, 2.0);

    ReviewRepo::delete(&pool, created.value.id, &e.client).await.unwrap();
    let profile = ProfileRepo::find_by_user(&pool, e.freelancer.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.rating, 0.0);
    assert_eq!(profile.total_reviews, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_rating_rejected(pool: PgPool) {
    let e = engaged(&pool, &[100]).await;
    complete(&pool, &e).await;
    let err = ReviewRepo::submit(&pool, e.contract.contract.id, &e.client, &review(6))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::InvalidArgument(_)));
}
