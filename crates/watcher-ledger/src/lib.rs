//! Ledger status lookup for the transaction watcher.
//!
//! This module defines the status provider abstraction and its
//! implementations. A provider answers point-in-time status queries for
//! submitted transactions; it owns the network protocol, and the monitoring
//! core never sees transport details beyond the classified sample.

use async_trait::async_trait;
use thiserror::Error;
use watcher_types::{StatusSample, TransactionHandle};

/// Re-export implementations
pub mod implementations {
	pub mod mock;
	pub mod soroban;
}

/// Errors that can occur during status lookups.
///
/// From the monitor's point of view every lookup error is transient: the
/// polling loop absorbs it and retries. The variants below exist for
/// diagnostics, not for control flow.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Error that occurs during network communication.
	#[error("network error: {0}")]
	Network(String),
	/// Error that occurs when the endpoint answers with an RPC-level error.
	#[error("rpc error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// Error that occurs when a response cannot be interpreted.
	#[error("invalid response: {0}")]
	InvalidResponse(String),
	/// Error that occurs when a provider configuration is invalid.
	#[error("configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for ledger status providers.
///
/// This trait must be implemented by any provider that wants to answer
/// status queries for the watcher. Status tags outside the known terminal
/// tags must classify as pending; a "not yet found" answer is a successful
/// lookup with a pending-like sample, not an error.
#[async_trait]
pub trait LedgerStatusProvider: Send + Sync {
	/// Looks up the current status of a transaction.
	///
	/// Returns one point-in-time sample. The lookup may fail with a
	/// transport error; the caller decides how to react.
	async fn get_status(
		&self,
		handle: &TransactionHandle,
	) -> Result<StatusSample, LedgerError>;

	/// Probes endpoint connectivity.
	///
	/// Used at startup to fail fast on misconfigured endpoints before any
	/// transaction is watched.
	async fn health(&self) -> Result<(), LedgerError>;
}

/// Type alias for provider factory functions.
///
/// This is the function signature that all provider implementations must
/// provide to create instances of their interface from configuration.
pub type LedgerFactory =
	fn(&toml::Value) -> Result<Box<dyn LedgerStatusProvider>, LedgerError>;

/// Get all registered provider implementations.
///
/// Returns a vector of (name, factory) tuples for all available providers.
/// The service binary uses this to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, LedgerFactory)> {
	use implementations::{mock, soroban};

	vec![
		("soroban", soroban::create_provider as LedgerFactory),
		("mock", mock::create_provider as LedgerFactory),
	]
}
