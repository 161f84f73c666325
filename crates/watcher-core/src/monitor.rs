//! Transaction confirmation monitoring.
//!
//! Polls a status provider at a fixed interval until the transaction
//! reaches a terminal state or a wall-clock deadline elapses. Transient
//! lookup failures and not-yet-found answers keep the loop polling; a
//! ledger-reported failure is authoritative and ends the session
//! immediately, with no further attempts.

use crate::event_bus::EventBus;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use watcher_ledger::LedgerStatusProvider;
use watcher_types::{
	AttemptOutcome, MonitorEvent, MonitorOutcome, StatusSample, TransactionHandle, TxStatus,
};

/// Default deadline for one monitoring session.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default delay between the end of one query and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

/// Errors surfaced to callers of
/// [`wait_for_transaction`](TransactionMonitor::wait_for_transaction).
///
/// Exactly two kinds cross the monitoring boundary. Every other failure
/// observed while polling is an internal retry signal and never surfaces.
#[derive(Debug, Error)]
pub enum MonitorError {
	/// The ledger reported the transaction as failed.
	#[error("transaction failed: {reason}")]
	TransactionFailed { reason: String },
	/// The deadline elapsed with no terminal status observed.
	#[error("transaction monitoring timed out after {timeout:?} for {handle}")]
	Timeout {
		handle: TransactionHandle,
		timeout: Duration,
	},
}

/// Monitors submitted transactions until confirmation, failure, or timeout.
///
/// Each call to [`monitor`](Self::monitor) is one independent sequential
/// session owning only its loop-local state (start instant, attempt
/// counter); concurrent sessions share nothing and need no coordination.
/// Dropping the returned future abandons the session: no further queries
/// are issued and no outcome is produced.
pub struct TransactionMonitor {
	provider: Arc<dyn LedgerStatusProvider>,
	event_bus: EventBus,
	timeout: Duration,
	poll_interval: Duration,
}

impl TransactionMonitor {
	/// Creates a monitor with explicit timing parameters.
	///
	/// The durations are used as given. Callers wanting a sane schedule
	/// keep `poll_interval` below `timeout`; the configuration layer
	/// enforces that ordering for the service binary.
	pub fn new(
		provider: Arc<dyn LedgerStatusProvider>,
		event_bus: EventBus,
		timeout: Duration,
		poll_interval: Duration,
	) -> Self {
		Self {
			provider,
			event_bus,
			timeout,
			poll_interval,
		}
	}

	/// Creates a monitor with the default 30 s deadline and 2 s interval.
	pub fn with_defaults(provider: Arc<dyn LedgerStatusProvider>, event_bus: EventBus) -> Self {
		Self::new(provider, event_bus, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
	}

	/// Monitors a transaction until it reaches a terminal state or the
	/// deadline elapses.
	///
	/// Exactly one outcome is produced per call. The deadline is checked
	/// before each query, so the attempt count is bounded by wall-clock
	/// time rather than fixed: slow queries reduce it. No sleep follows a
	/// terminal transition.
	pub async fn monitor(&self, handle: &TransactionHandle) -> MonitorOutcome {
		let start = Instant::now();
		let mut attempt: u32 = 0;

		tracing::info!(
			tx_hash = %handle.short(),
			timeout_ms = self.timeout.as_millis() as u64,
			poll_interval_ms = self.poll_interval.as_millis() as u64,
			"Started transaction monitoring"
		);
		self.event_bus
			.publish(MonitorEvent::Started {
				handle: handle.clone(),
				timeout: self.timeout,
				poll_interval: self.poll_interval,
			})
			.ok();

		while start.elapsed() < self.timeout {
			attempt += 1;

			match self.provider.get_status(handle).await {
				Ok(sample) => {
					self.publish_attempt(handle, attempt, AttemptOutcome::Status(sample.status));

					match sample.status {
						TxStatus::Success => {
							tracing::info!(
								tx_hash = %handle.short(),
								attempt,
								"Transaction confirmed"
							);
							return self.finish(handle, MonitorOutcome::Confirmed { sample });
						}
						TxStatus::Failed => {
							// Authoritative: a reported failure is never retried.
							let reason = describe_failure(&sample);
							tracing::warn!(
								tx_hash = %handle.short(),
								attempt,
								%reason,
								"Transaction failed"
							);
							return self.finish(handle, MonitorOutcome::Failed { reason, sample });
						}
						TxStatus::Pending => {
							tracing::debug!(
								tx_hash = %handle.short(),
								attempt,
								elapsed_ms = start.elapsed().as_millis() as u64,
								"Transaction still pending"
							);
						}
					}
				}
				Err(e) => {
					// Expected early in a transaction's life; keep polling.
					tracing::debug!(
						tx_hash = %handle.short(),
						attempt,
						error = %e,
						"Status lookup failed, retrying"
					);
					self.publish_attempt(
						handle,
						attempt,
						AttemptOutcome::LookupFailed {
							message: e.to_string(),
						},
					);
				}
			}

			tokio::time::sleep(self.poll_interval).await;
		}

		let elapsed = start.elapsed();
		tracing::warn!(
			tx_hash = %handle.short(),
			elapsed_ms = elapsed.as_millis() as u64,
			"Transaction monitoring timed out"
		);
		self.finish(handle, MonitorOutcome::TimedOut { elapsed })
	}

	/// Monitors a transaction and maps the outcome onto the caller-facing
	/// result: the confirmed sample, or one of the two terminal errors.
	pub async fn wait_for_transaction(
		&self,
		handle: &TransactionHandle,
	) -> Result<StatusSample, MonitorError> {
		match self.monitor(handle).await {
			MonitorOutcome::Confirmed { sample } => Ok(sample),
			MonitorOutcome::Failed { reason, .. } => {
				Err(MonitorError::TransactionFailed { reason })
			}
			MonitorOutcome::TimedOut { .. } => Err(MonitorError::Timeout {
				handle: handle.clone(),
				timeout: self.timeout,
			}),
		}
	}

	fn publish_attempt(&self, handle: &TransactionHandle, attempt: u32, outcome: AttemptOutcome) {
		self.event_bus
			.publish(MonitorEvent::Attempt {
				handle: handle.clone(),
				attempt,
				outcome,
			})
			.ok();
	}

	fn finish(&self, handle: &TransactionHandle, outcome: MonitorOutcome) -> MonitorOutcome {
		self.event_bus
			.publish(MonitorEvent::Finished {
				handle: handle.clone(),
				outcome: outcome.clone(),
			})
			.ok();
		outcome
	}
}

/// Builds a failure reason from the terminal sample, quoting the raw
/// provider status tag when one is present.
fn describe_failure(sample: &StatusSample) -> String {
	let tag = sample
		.raw
		.as_ref()
		.and_then(|raw| raw.get("status"))
		.and_then(|v| v.as_str())
		.unwrap_or("FAILED");
	format!("ledger reported status {}", tag)
}

#[cfg(test)]
mod tests {
	use super::*;
	use watcher_ledger::implementations::mock::{MockProvider, ScriptedLookup};

	fn handle() -> TransactionHandle {
		TransactionHandle::new("ab12cd34ef56ab12cd34ef56ab12cd34ef56ab12cd34ef56ab12cd34ef56ab12")
			.unwrap()
	}

	fn monitor_with(
		script: Vec<ScriptedLookup>,
		timeout_ms: u64,
		poll_interval_ms: u64,
	) -> (TransactionMonitor, Arc<MockProvider>) {
		let provider = Arc::new(MockProvider::new(script));
		let monitor = TransactionMonitor::new(
			provider.clone(),
			EventBus::default(),
			Duration::from_millis(timeout_ms),
			Duration::from_millis(poll_interval_ms),
		);
		(monitor, provider)
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirms_after_pending_attempts() {
		// Scenario: not found twice, then success on the third attempt.
		let (monitor, provider) = monitor_with(
			vec![
				ScriptedLookup::Status(TxStatus::Pending),
				ScriptedLookup::Status(TxStatus::Pending),
				ScriptedLookup::Status(TxStatus::Success),
			],
			6_000,
			2_000,
		);

		let start = Instant::now();
		let outcome = monitor.monitor(&handle()).await;
		let elapsed = start.elapsed();

		assert!(outcome.is_confirmed());
		assert_eq!(provider.calls(), 3);
		// Two sleeps separate the three attempts.
		assert!(elapsed >= Duration::from_millis(4_000));
		assert!(elapsed < Duration::from_millis(6_000));
	}

	#[tokio::test(start_paused = true)]
	async fn test_times_out_when_never_terminal() {
		let (monitor, provider) =
			monitor_with(vec![ScriptedLookup::Status(TxStatus::Pending)], 6_000, 2_000);

		let start = Instant::now();
		let outcome = monitor.monitor(&handle()).await;
		let elapsed = start.elapsed();

		match outcome {
			MonitorOutcome::TimedOut { elapsed: reported } => {
				assert!(reported >= Duration::from_millis(6_000));
			}
			other => panic!("expected timeout, got {:?}", other),
		}
		// Resolves at or after the deadline, within one extra interval.
		assert!(elapsed >= Duration::from_millis(6_000));
		assert!(elapsed < Duration::from_millis(8_000));
		assert_eq!(provider.calls(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_failure_returns_immediately_without_retry() {
		// A success entry follows the failure; it must never be reached.
		let (monitor, provider) = monitor_with(
			vec![
				ScriptedLookup::Status(TxStatus::Failed),
				ScriptedLookup::Status(TxStatus::Success),
			],
			60_000,
			2_000,
		);

		let start = Instant::now();
		let outcome = monitor.monitor(&handle()).await;

		assert!(matches!(outcome, MonitorOutcome::Failed { .. }));
		assert_eq!(provider.calls(), 1);
		// No sleep follows a terminal transition.
		assert_eq!(start.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn test_transport_errors_are_absorbed() {
		let (monitor, provider) = monitor_with(
			vec![
				ScriptedLookup::TransportError("connection refused".to_string()),
				ScriptedLookup::TransportError("request timed out".to_string()),
				ScriptedLookup::Status(TxStatus::Success),
			],
			30_000,
			2_000,
		);

		let outcome = monitor.monitor(&handle()).await;

		assert!(outcome.is_confirmed());
		assert_eq!(provider.calls(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_maps_failure_to_error() {
		let provider = Arc::new(MockProvider::new(vec![ScriptedLookup::Status(
			TxStatus::Failed,
		)]));
		let monitor = TransactionMonitor::with_defaults(provider, EventBus::default());

		let result = monitor.wait_for_transaction(&handle()).await;

		match result {
			Err(MonitorError::TransactionFailed { reason }) => {
				assert!(reason.contains("FAILED"));
			}
			other => panic!("expected failure error, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_maps_timeout_to_error() {
		let (monitor, _provider) =
			monitor_with(vec![ScriptedLookup::Status(TxStatus::Pending)], 6_000, 2_000);

		let result = monitor.wait_for_transaction(&handle()).await;

		match result {
			Err(MonitorError::Timeout { timeout, .. }) => {
				assert_eq!(timeout, Duration::from_millis(6_000));
			}
			other => panic!("expected timeout error, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_returns_confirmed_sample() {
		let (monitor, _provider) =
			monitor_with(vec![ScriptedLookup::Status(TxStatus::Success)], 6_000, 2_000);

		let sample = monitor.wait_for_transaction(&handle()).await.unwrap();
		assert_eq!(sample.status, TxStatus::Success);
	}

	#[test]
	fn test_failure_reason_includes_provider_tag() {
		let sample = StatusSample {
			status: TxStatus::Failed,
			raw: Some(serde_json::json!({ "status": "FAILED", "ledger": 7 })),
		};
		assert_eq!(describe_failure(&sample), "ledger reported status FAILED");

		let bare = StatusSample::of(TxStatus::Failed);
		assert_eq!(describe_failure(&bare), "ledger reported status FAILED");
	}

	#[tokio::test(start_paused = true)]
	async fn test_events_cover_the_whole_session() {
		let provider = Arc::new(MockProvider::new(vec![
			ScriptedLookup::Status(TxStatus::Pending),
			ScriptedLookup::TransportError("connection refused".to_string()),
			ScriptedLookup::Status(TxStatus::Success),
		]));
		let bus = EventBus::default();
		let mut receiver = bus.subscribe();
		let monitor = TransactionMonitor::new(
			provider,
			bus.clone(),
			Duration::from_millis(30_000),
			Duration::from_millis(2_000),
		);

		monitor.monitor(&handle()).await;

		let mut events = Vec::new();
		while let Ok(event) = receiver.try_recv() {
			events.push(event);
		}

		assert!(matches!(events.first(), Some(MonitorEvent::Started { .. })));
		let attempts = events
			.iter()
			.filter(|e| matches!(e, MonitorEvent::Attempt { .. }))
			.count();
		assert_eq!(attempts, 3);
		let terminal = events
			.iter()
			.filter(|e| matches!(e, MonitorEvent::Finished { .. }))
			.count();
		assert_eq!(terminal, 1);
		assert!(matches!(events.last(), Some(MonitorEvent::Finished { .. })));
	}

	#[tokio::test(start_paused = true)]
	async fn test_concurrent_sessions_are_independent() {
		let confirming = Arc::new(MockProvider::new(vec![
			ScriptedLookup::Status(TxStatus::Pending),
			ScriptedLookup::Status(TxStatus::Success),
		]));
		let stalling = Arc::new(MockProvider::new(vec![ScriptedLookup::Status(
			TxStatus::Pending,
		)]));

		let bus = EventBus::default();
		let fast = TransactionMonitor::new(
			confirming,
			bus.clone(),
			Duration::from_millis(10_000),
			Duration::from_millis(2_000),
		);
		let slow = TransactionMonitor::new(
			stalling,
			bus,
			Duration::from_millis(6_000),
			Duration::from_millis(2_000),
		);

		let fast_handle = handle();
		let slow_handle = handle();
		let (first, second) = tokio::join!(fast.monitor(&fast_handle), slow.monitor(&slow_handle));

		assert!(first.is_confirmed());
		assert!(matches!(second, MonitorOutcome::TimedOut { .. }));
	}
}
