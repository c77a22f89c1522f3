use std::sync::Arc;

use gigboard_db::Outcome;
use gigboard_events::{dispatch, EventBus, NotificationSink};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: gigboard_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Fan-out for committed notices; the persistence writer subscribes here.
    pub event_bus: Arc<EventBus>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl AppState {
    /// Hand a committed operation's notices to the sink and return its value.
    ///
    /// Delivery problems are logged by [`dispatch`] and never reach the caller.
    pub fn deliver<T>(&self, outcome: Outcome<T>) -> T {
        dispatch(self.notifier.as_ref(), outcome.notices);
        outcome.value
    }
}
