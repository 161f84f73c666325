//! Event types published during monitoring sessions.
//!
//! Events flow through a broadcast bus so that consumers can observe
//! monitoring progress without being part of it. They are informational
//! only: no consumer can affect the control flow of a running session.

use crate::{MonitorOutcome, TransactionHandle, TxStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a single poll attempt observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttemptOutcome {
	/// The provider answered and the status was classified.
	Status(TxStatus),
	/// The lookup itself failed; the session keeps polling.
	LookupFailed {
		/// Diagnostic message from the failed lookup.
		message: String,
	},
}

/// Events published over the lifetime of one monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonitorEvent {
	/// Monitoring has started for a transaction.
	Started {
		handle: TransactionHandle,
		timeout: Duration,
		poll_interval: Duration,
	},
	/// One status query completed and was classified.
	Attempt {
		handle: TransactionHandle,
		attempt: u32,
		outcome: AttemptOutcome,
	},
	/// The session reached its terminal outcome.
	Finished {
		handle: TransactionHandle,
		outcome: MonitorOutcome,
	},
}
