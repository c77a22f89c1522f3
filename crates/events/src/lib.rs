//! Notification boundary for the gigboard engine.
//!
//! Engine operations return the [`Notice`](gigboard_core::notice::Notice)s
//! they produce. After the owning transaction commits, the caller hands them
//! to a [`NotificationSink`]. Delivery never feeds back into the operation.
//!
//! - [`EventBus`]: in-process fan-out backed by `tokio::sync::broadcast`.
//! - [`BusNotifier`]: the production sink, publishing onto the bus.
//! - [`NotificationPersistence`]: background writer storing every notice in
//!   the `notifications` table.

pub mod bus;
pub mod notifier;
pub mod persistence;

pub use bus::{EventBus, NoticeEvent};
pub use notifier::{dispatch, BusNotifier, NotificationSink, SinkError};
pub use persistence::NotificationPersistence;
