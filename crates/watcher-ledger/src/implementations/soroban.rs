//! Soroban RPC status provider.
//!
//! Speaks the JSON-RPC 2.0 `getTransaction` method of a Soroban RPC
//! endpoint. A `NOT_FOUND` answer is a successful lookup whose sample is
//! pending-like: newly submitted transactions are often not indexed by the
//! endpoint yet, and callers are expected to keep polling.

use crate::{LedgerError, LedgerStatusProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use watcher_types::{StatusSample, TransactionHandle, TxStatus};

/// Configuration for the Soroban RPC provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SorobanConfig {
	/// RPC endpoint URL.
	pub rpc_url: String,
	/// Per-request timeout in milliseconds.
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}

/// Returns the default per-request timeout in milliseconds.
///
/// This bounds a single `getTransaction` call so that one slow request
/// cannot consume the whole monitoring deadline.
fn default_request_timeout_ms() -> u64 {
	10_000
}

/// Soroban RPC implementation of the status provider.
///
/// Holds one shared HTTP client; lookups are stateless and the provider
/// can serve any number of concurrent monitoring sessions.
pub struct SorobanProvider {
	client: reqwest::Client,
	rpc_url: String,
}

#[derive(Debug, Serialize)]
struct RpcRequest {
	jsonrpc: &'static str,
	id: u32,
	method: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	result: Option<serde_json::Value>,
	error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

impl SorobanProvider {
	/// Creates a new provider for the given endpoint.
	pub fn new(config: SorobanConfig) -> Result<Self, LedgerError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_millis(config.request_timeout_ms))
			.build()
			.map_err(|e| LedgerError::Network(format!("failed to build http client: {}", e)))?;

		Ok(Self {
			client,
			rpc_url: config.rpc_url,
		})
	}

	/// Issues one JSON-RPC call and unwraps the result payload.
	async fn call(
		&self,
		method: &'static str,
		params: Option<serde_json::Value>,
	) -> Result<serde_json::Value, LedgerError> {
		let request = RpcRequest {
			jsonrpc: "2.0",
			id: 1,
			method,
			params,
		};

		let response = self
			.client
			.post(&self.rpc_url)
			.json(&request)
			.send()
			.await
			.map_err(|e| LedgerError::Network(e.to_string()))?;

		let body: RpcResponse = response
			.json()
			.await
			.map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;

		if let Some(error) = body.error {
			return Err(LedgerError::Rpc {
				code: error.code,
				message: error.message,
			});
		}

		body.result.ok_or_else(|| {
			LedgerError::InvalidResponse("response carries neither result nor error".to_string())
		})
	}
}

/// Classifies a `getTransaction` result payload into a status sample.
///
/// The payload's `status` field is classified by tag; the full payload is
/// carried along opaquely.
fn sample_from_result(result: serde_json::Value) -> Result<StatusSample, LedgerError> {
	let tag = result
		.get("status")
		.and_then(|v| v.as_str())
		.ok_or_else(|| LedgerError::InvalidResponse("missing status field".to_string()))?;

	Ok(StatusSample {
		status: TxStatus::from_provider_tag(tag),
		raw: Some(result),
	})
}

#[async_trait]
impl LedgerStatusProvider for SorobanProvider {
	async fn get_status(
		&self,
		handle: &TransactionHandle,
	) -> Result<StatusSample, LedgerError> {
		let result = self
			.call("getTransaction", Some(json!({ "hash": handle.as_str() })))
			.await?;

		let sample = sample_from_result(result)?;
		tracing::trace!(
			tx_hash = %handle.short(),
			status = ?sample.status,
			"Fetched transaction status"
		);
		Ok(sample)
	}

	async fn health(&self) -> Result<(), LedgerError> {
		let result = self.call("getHealth", None).await?;

		match result.get("status").and_then(|v| v.as_str()) {
			Some("healthy") => Ok(()),
			Some(other) => Err(LedgerError::Network(format!(
				"endpoint reports unhealthy status: {}",
				other
			))),
			None => Err(LedgerError::InvalidResponse(
				"missing status field".to_string(),
			)),
		}
	}
}

/// Factory function to create a Soroban provider from configuration.
///
/// Configuration parameters:
/// - `rpc_url` (required): endpoint URL
/// - `request_timeout_ms` (optional): per-request timeout, default 10000
pub fn create_provider(
	config: &toml::Value,
) -> Result<Box<dyn LedgerStatusProvider>, LedgerError> {
	let config: SorobanConfig = config
		.clone()
		.try_into()
		.map_err(|e| LedgerError::Configuration(format!("invalid soroban config: {}", e)))?;

	Ok(Box::new(SorobanProvider::new(config)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_success_result_classifies_as_success() {
		let result = json!({
			"status": "SUCCESS",
			"ledger": 2_540_076,
			"applicationOrder": 1
		});

		let sample = sample_from_result(result).unwrap();
		assert_eq!(sample.status, TxStatus::Success);
		assert_eq!(
			sample.raw.unwrap().get("ledger").unwrap().as_u64(),
			Some(2_540_076)
		);
	}

	#[test]
	fn test_failed_result_classifies_as_failed() {
		let result = json!({ "status": "FAILED", "ledger": 2_540_099 });

		let sample = sample_from_result(result).unwrap();
		assert_eq!(sample.status, TxStatus::Failed);
	}

	#[test]
	fn test_not_found_result_classifies_as_pending() {
		// NOT_FOUND is a successful lookup, not an error: the transaction
		// may simply not be indexed yet.
		let result = json!({ "status": "NOT_FOUND" });

		let sample = sample_from_result(result).unwrap();
		assert_eq!(sample.status, TxStatus::Pending);
	}

	#[test]
	fn test_missing_status_field_is_invalid() {
		let result = json!({ "ledger": 1 });

		assert!(matches!(
			sample_from_result(result),
			Err(LedgerError::InvalidResponse(_))
		));
	}

	#[test]
	fn test_config_default_request_timeout() {
		let config: SorobanConfig =
			toml::from_str("rpc_url = \"https://soroban-testnet.stellar.org\"").unwrap();
		assert_eq!(config.request_timeout_ms, 10_000);
	}

	#[test]
	fn test_factory_rejects_missing_rpc_url() {
		let config: toml::Value = toml::from_str("request_timeout_ms = 5000").unwrap();
		assert!(matches!(
			create_provider(&config),
			Err(LedgerError::Configuration(_))
		));
	}
}
