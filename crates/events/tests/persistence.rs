use std::sync::Arc;

use gigboard_core::notice::{wallet_link, Notice, NoticeKind};
use gigboard_core::roles::ROLE_CLIENT;
use gigboard_db::models::user::CreateUser;
use gigboard_db::repositories::{NotificationRepo, UserRepo};
use gigboard_events::{dispatch, BusNotifier, EventBus, NotificationPersistence};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_dispatched_notices_are_stored(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            email: "owner@example.com".to_string(),
            display_name: "owner".to_string(),
            role: ROLE_CLIENT.to_string(),
        },
    )
    .await
    .unwrap();

    let bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();
    let writer = tokio::spawn(NotificationPersistence::run(
        pool.clone(),
        bus.subscribe(),
        cancel.clone(),
    ));

    let notifier = BusNotifier::new(Arc::clone(&bus));
    dispatch(
        &notifier,
        vec![
            Notice::new(user.id, NoticeKind::WithdrawalSettled, "Paid", "Done", wallet_link()),
            Notice::new(user.id, NoticeKind::WithdrawalSettled, "Paid", "Again", wallet_link()),
        ],
    );

    cancel.cancel();
    writer.await.unwrap();

    let stored = NotificationRepo::list_for_user(&pool, user.id, false, 10, 0)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].kind, "withdrawal_settled");
    assert_eq!(NotificationRepo::unread_count(&pool, user.id).await.unwrap(), 2);
}
