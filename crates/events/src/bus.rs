//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use gigboard_core::notice::Notice;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A notice as it travels over the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeEvent {
    pub notice: Notice,

    /// When the notice was handed to the bus (UTC).
    pub emitted_at: DateTime<Utc>,
}

impl NoticeEvent {
    pub fn new(notice: Notice) -> Self {
        Self {
            notice,
            emitted_at: Utc::now(),
        }
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Every subscriber independently receives every published [`NoticeEvent`].
pub struct EventBus {
    sender: broadcast::Sender<NoticeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. With no
    /// subscribers the event is dropped and zero is returned.
    pub fn publish(&self, event: NoticeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NoticeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
