//! Transaction identity and status types.
//!
//! This module defines how submitted transactions are named and how the
//! status tags reported by a ledger endpoint are classified. Classification
//! is a pure function of the reported tag so that identical samples always
//! produce identical state transitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a transaction handle.
#[derive(Debug, Error)]
pub enum HandleError {
	/// Error that occurs when the supplied hash string is empty.
	#[error("transaction handle cannot be empty")]
	Empty,
}

/// Identifier of a previously submitted ledger transaction.
///
/// The handle is opaque to the watcher: it is passed through to the status
/// provider unchanged and never interpreted. Construction rejects empty
/// strings; everything else is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHandle(String);

impl TransactionHandle {
	/// Creates a handle from a hash string.
	pub fn new(hash: impl Into<String>) -> Result<Self, HandleError> {
		let hash = hash.into();
		if hash.is_empty() {
			return Err(HandleError::Empty);
		}
		Ok(Self(hash))
	}

	/// Returns the full hash string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns a truncated form for log output.
	///
	/// Shows only the first 8 characters followed by ".." for longer hashes.
	pub fn short(&self) -> String {
		if self.0.len() <= 8 {
			self.0.clone()
		} else {
			format!("{}..", &self.0[..8])
		}
	}
}

impl std::fmt::Display for TransactionHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Classified status of a transaction as reported by a status provider.
///
/// Only success and failure are terminal. Every provider tag outside the
/// known terminal tags classifies as pending, including "not yet found":
/// a newly submitted transaction may not be indexed by the endpoint yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
	/// The transaction has not reached a terminal state yet.
	Pending,
	/// The transaction executed successfully.
	Success,
	/// The ledger reported the transaction as failed.
	Failed,
}

impl TxStatus {
	/// Classifies a provider-reported status tag.
	pub fn from_provider_tag(tag: &str) -> Self {
		match tag {
			"SUCCESS" => TxStatus::Success,
			"FAILED" => TxStatus::Failed,
			_ => TxStatus::Pending,
		}
	}

	/// Whether no further state change is expected after this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, TxStatus::Success | TxStatus::Failed)
	}
}

/// Result of a single status query.
///
/// One sample is created per poll attempt and discarded after
/// classification. The raw provider payload is carried opaquely for
/// diagnostics and never interpreted beyond the status tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSample {
	/// Classified status tag.
	pub status: TxStatus,
	/// Raw provider payload, if the provider supplied one.
	pub raw: Option<serde_json::Value>,
}

impl StatusSample {
	/// Creates a sample with no provider payload attached.
	pub fn of(status: TxStatus) -> Self {
		Self { status, raw: None }
	}
}
