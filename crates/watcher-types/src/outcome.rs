//! Terminal outcomes of a monitoring session.

use crate::StatusSample;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal result of one monitoring session.
///
/// Exactly one outcome is produced per invocation and the session performs
/// no further queries after producing it. Ownership transfers to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonitorOutcome {
	/// The ledger reported terminal success.
	Confirmed {
		/// The sample that carried the terminal status.
		sample: StatusSample,
	},
	/// The ledger reported terminal failure.
	Failed {
		/// Human-readable reason, including the reported status tag.
		reason: String,
		/// The sample that carried the terminal status.
		sample: StatusSample,
	},
	/// The deadline elapsed with no terminal status observed.
	TimedOut {
		/// Wall-clock time spent polling before giving up.
		elapsed: Duration,
	},
}

impl MonitorOutcome {
	/// Whether the transaction was confirmed.
	pub fn is_confirmed(&self) -> bool {
		matches!(self, MonitorOutcome::Confirmed { .. })
	}
}
