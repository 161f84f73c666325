//! Configuration module for the transaction watcher.
//!
//! This module provides structures and utilities for managing watcher
//! configuration. It supports loading configuration from TOML files,
//! resolving environment variable references, and validating the result
//! before any provider is built.
//!
//! Environment references use `${VAR_NAME}`, with an optional default as
//! `${VAR_NAME:-default_value}`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the watcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Monitoring timing parameters.
	#[serde(default)]
	pub watcher: WatcherConfig,
	/// Ledger status provider configuration.
	pub ledger: LedgerConfig,
}

/// Monitoring timing parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatcherConfig {
	/// Wall-clock deadline for one monitoring session, in milliseconds.
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Delay between poll attempts, in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

impl WatcherConfig {
	/// Session deadline as a duration.
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Poll spacing as a duration.
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

impl Default for WatcherConfig {
	fn default() -> Self {
		Self {
			timeout_ms: default_timeout_ms(),
			poll_interval_ms: default_poll_interval_ms(),
		}
	}
}

/// Returns the default monitoring deadline in milliseconds.
fn default_timeout_ms() -> u64 {
	30_000
}

/// Returns the default poll interval in milliseconds.
fn default_poll_interval_ms() -> u64 {
	2_000
}

/// Ledger status provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of provider implementation names to their configurations.
	/// Each implementation has its own format stored as raw TOML values.
	pub implementations: HashMap<String, toml::Value>,
}

/// Resolves environment variable references in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable,
/// falling back to the default in `${VAR_NAME:-default_value}` when the
/// variable is unset. A reference without a default to an unset variable
/// is an error.
///
/// Input is capped at 256 KiB to bound regex work on hostile files.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 256 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
		.map_err(|e| ConfigError::Parse(format!("regex error: {}", e)))?;

	let mut missing: Option<String> = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let name = &caps[1];
		match std::env::var(name) {
			Ok(value) => value,
			Err(_) => match caps.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					missing.get_or_insert_with(|| name.to_string());
					String::new()
				}
			},
		}
	});

	if let Some(name) = missing {
		return Err(ConfigError::Validation(format!(
			"environment variable '{}' not found",
			name
		)));
	}

	Ok(resolved.into_owned())
}

impl Config {
	/// Loads configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates the configuration so that misconfiguration fails at load
	/// time rather than mid-watch.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.watcher.timeout_ms == 0 {
			return Err(ConfigError::Validation(
				"timeout_ms must be greater than 0".into(),
			));
		}
		if self.watcher.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"poll_interval_ms must be greater than 0".into(),
			));
		}
		if self.watcher.poll_interval_ms >= self.watcher.timeout_ms {
			return Err(ConfigError::Validation(
				"poll_interval_ms must be less than timeout_ms".into(),
			));
		}

		if self.ledger.primary.is_empty() {
			return Err(ConfigError::Validation(
				"ledger primary implementation cannot be empty".into(),
			));
		}
		if self.ledger.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"at least one ledger implementation must be configured".into(),
			));
		}
		if !self
			.ledger
			.implementations
			.contains_key(&self.ledger.primary)
		{
			return Err(ConfigError::Validation(format!(
				"primary ledger '{}' not found in implementations",
				self.ledger.primary
			)));
		}

		Ok(())
	}
}

/// Implementation of FromStr for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
