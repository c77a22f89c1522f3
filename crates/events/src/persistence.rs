//! Durable notification storage.
//!
//! [`NotificationPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received notice to the `notifications` table. It runs
//! as a long-lived background task.

use gigboard_db::repositories::NotificationRepo;
use gigboard_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::NoticeEvent;

pub struct NotificationPersistence;

impl NotificationPersistence {
    /// Run the persistence loop.
    ///
    /// Exits when `cancel` fires or when the bus is dropped. Events already
    /// buffered when `cancel` fires are written before returning.
    pub async fn run(
        pool: DbPool,
        mut receiver: broadcast::Receiver<NoticeEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    Self::drain(&pool, &mut receiver).await;
                    tracing::info!("Notification persistence cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => Self::persist(&pool, &event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            skipped = n,
                            "Notification persistence lagged, some notices were not stored"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notification persistence shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn drain(pool: &DbPool, receiver: &mut broadcast::Receiver<NoticeEvent>) {
        while let Ok(event) = receiver.try_recv() {
            Self::persist(pool, &event).await;
        }
    }

    async fn persist(pool: &DbPool, event: &NoticeEvent) {
        if let Err(e) = NotificationRepo::create(pool, &event.notice).await {
            tracing::error!(
                error = %e,
                recipient_id = event.notice.recipient_id,
                kind = event.notice.kind.as_str(),
                "Failed to persist notification"
            );
        }
    }
}
