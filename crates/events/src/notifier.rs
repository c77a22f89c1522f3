//! The sink engine operations hand their notices to.

use std::sync::Arc;

use gigboard_core::notice::Notice;

use crate::bus::{EventBus, NoticeEvent};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("No subscriber is listening for notices")]
    NoSubscribers,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Receives notices after the producing transaction has committed.
///
/// Implementations must not block: they queue and return.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice) -> Result<(), SinkError>;
}

/// Publishes every notice onto the [`EventBus`].
#[derive(Clone)]
pub struct BusNotifier {
    bus: Arc<EventBus>,
}

impl BusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl NotificationSink for BusNotifier {
    fn notify(&self, notice: Notice) -> Result<(), SinkError> {
        match self.bus.publish(NoticeEvent::new(notice)) {
            0 => Err(SinkError::NoSubscribers),
            _ => Ok(()),
        }
    }
}

/// Hand `notices` to `sink`, one at a time.
///
/// Failures are logged and swallowed; the operation that produced the
/// notices has already succeeded.
pub fn dispatch(sink: &dyn NotificationSink, notices: Vec<Notice>) {
    for notice in notices {
        let recipient_id = notice.recipient_id;
        let kind = notice.kind.as_str();
        if let Err(e) = sink.notify(notice) {
            tracing::warn!(error = %e, recipient_id, kind, "Notice was not delivered");
        }
    }
}
