//! Broadcast event bus for monitoring events.
//!
//! Decouples monitor progress reporting from its consumers. Publishing
//! never blocks and delivery is best effort: a bus with no subscribers
//! drops events, and a consumer that lags too far behind loses the oldest
//! events rather than stalling the publisher.

use tokio::sync::broadcast;
use watcher_types::MonitorEvent;

/// Default number of undelivered events retained per subscriber.
const DEFAULT_CAPACITY: usize = 256;

/// Event bus carrying monitoring events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<MonitorEvent>,
}

impl EventBus {
	/// Creates a bus retaining up to `capacity` undelivered events per
	/// subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Fails only when no subscriber exists; publishers treat that as
	/// uninteresting and ignore the result.
	pub fn publish(
		&self,
		event: MonitorEvent,
	) -> Result<(), broadcast::error::SendError<MonitorEvent>> {
		self.sender.send(event).map(|_| ())
	}

	/// Creates a new subscription receiving events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
