//! Scripted status provider for tests and development.
//!
//! This implementation yields a configured sequence of lookup results,
//! repeating the final entry once the script is exhausted. It is the
//! provider used by the monitoring tests to replay exact status sequences
//! without a network.

use crate::{LedgerError, LedgerStatusProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use watcher_types::{StatusSample, TransactionHandle, TxStatus};

/// One scripted lookup result.
#[derive(Debug, Clone)]
pub enum ScriptedLookup {
	/// The lookup succeeds with the given status.
	Status(TxStatus),
	/// The lookup fails with a transport error.
	TransportError(String),
}

/// Configuration for the mock provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
	/// Status tags to replay in order, classified like provider tags.
	#[serde(default)]
	pub statuses: Vec<String>,
}

/// Scripted provider implementation.
///
/// Lookups consume the script front to back; once exhausted, the last
/// entry repeats forever. An empty script answers pending on every lookup.
pub struct MockProvider {
	script: Vec<ScriptedLookup>,
	position: AtomicUsize,
}

impl MockProvider {
	/// Creates a provider replaying the given script.
	pub fn new(script: Vec<ScriptedLookup>) -> Self {
		Self {
			script,
			position: AtomicUsize::new(0),
		}
	}

	/// Number of lookups served so far.
	pub fn calls(&self) -> usize {
		self.position.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl LedgerStatusProvider for MockProvider {
	async fn get_status(
		&self,
		_handle: &TransactionHandle,
	) -> Result<StatusSample, LedgerError> {
		let index = self.position.fetch_add(1, Ordering::SeqCst);
		let entry = self.script.get(index).or_else(|| self.script.last());

		match entry {
			Some(ScriptedLookup::Status(status)) => Ok(StatusSample::of(*status)),
			Some(ScriptedLookup::TransportError(message)) => {
				Err(LedgerError::Network(message.clone()))
			}
			None => Ok(StatusSample::of(TxStatus::Pending)),
		}
	}

	async fn health(&self) -> Result<(), LedgerError> {
		Ok(())
	}
}

/// Factory function to create a mock provider from configuration.
///
/// Configuration parameters:
/// - `statuses` (optional): status tags to replay in order, e.g.
///   `["NOT_FOUND", "NOT_FOUND", "SUCCESS"]`
pub fn create_provider(
	config: &toml::Value,
) -> Result<Box<dyn LedgerStatusProvider>, LedgerError> {
	let config: MockConfig = config
		.clone()
		.try_into()
		.map_err(|e| LedgerError::Configuration(format!("invalid mock config: {}", e)))?;

	let script = config
		.statuses
		.iter()
		.map(|tag| ScriptedLookup::Status(TxStatus::from_provider_tag(tag)))
		.collect();

	Ok(Box::new(MockProvider::new(script)))
}
