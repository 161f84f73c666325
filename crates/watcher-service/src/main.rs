//! Main entry point for the transaction watcher service.
//!
//! This binary watches one or more submitted transactions until each
//! reaches a terminal state or times out. The status provider is pluggable
//! and selected by configuration; each watched hash runs as its own
//! independent monitoring session.

use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use watcher_config::Config;
use watcher_core::{EventBus, TransactionMonitor};
use watcher_ledger::{get_all_implementations, LedgerFactory, LedgerStatusProvider};
use watcher_types::{MonitorOutcome, TransactionHandle};

/// Command-line arguments for the watcher service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Transaction hashes to watch
	#[arg(required = true)]
	hashes: Vec<String>,
}

/// Main entry point for the watcher service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the configured status provider and probes it
/// 5. Watches every supplied hash concurrently and reports outcomes
#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt().with_env_filter(env_filter).with_target(true).init();

	match run(args).await {
		Ok(true) => ExitCode::SUCCESS,
		Ok(false) => ExitCode::FAILURE,
		Err(e) => {
			tracing::error!("{}", e);
			ExitCode::FAILURE
		}
	}
}

/// Runs the service; returns whether every watched transaction confirmed.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
	let config = Config::from_file(&args.config)?;
	tracing::info!(
		primary = %config.ledger.primary,
		timeout_ms = config.watcher.timeout_ms,
		poll_interval_ms = config.watcher.poll_interval_ms,
		"Loaded configuration"
	);

	let provider: Arc<dyn LedgerStatusProvider> = Arc::from(build_provider(&config)?);

	// Fail fast on a dead or misconfigured endpoint before watching.
	provider.health().await?;
	tracing::info!("Ledger endpoint healthy");

	let event_bus = EventBus::default();
	let monitor = Arc::new(TransactionMonitor::new(
		provider,
		event_bus,
		config.watcher.timeout(),
		config.watcher.poll_interval(),
	));

	let mut watches = Vec::new();
	for hash in args.hashes {
		let handle = TransactionHandle::new(hash)?;
		let monitor = Arc::clone(&monitor);
		watches.push(tokio::spawn(async move {
			let outcome = monitor.monitor(&handle).await;
			(handle, outcome)
		}));
	}

	tokio::select! {
		results = futures::future::join_all(watches) => {
			let mut all_confirmed = true;
			for joined in results {
				let (handle, outcome) = joined?;
				match outcome {
					MonitorOutcome::Confirmed { .. } => {
						tracing::info!(tx_hash = %handle, "Confirmed");
					}
					MonitorOutcome::Failed { reason, .. } => {
						all_confirmed = false;
						tracing::error!(tx_hash = %handle, %reason, "Failed");
					}
					MonitorOutcome::TimedOut { elapsed } => {
						all_confirmed = false;
						tracing::warn!(
							tx_hash = %handle,
							elapsed_ms = elapsed.as_millis() as u64,
							"Timed out"
						);
					}
				}
			}
			Ok(all_confirmed)
		}

		// Returning drops the runtime and with it every in-flight watch;
		// abandoned sessions issue no further queries.
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Interrupted, abandoning watches");
			Ok(false)
		}
	}
}

/// Builds the configured primary provider from the factory map.
fn build_provider(config: &Config) -> Result<Box<dyn LedgerStatusProvider>, Box<dyn std::error::Error>> {
	let factories: HashMap<&str, LedgerFactory> = get_all_implementations().into_iter().collect();

	let factory = factories
		.get(config.ledger.primary.as_str())
		.ok_or_else(|| format!("unknown ledger implementation '{}'", config.ledger.primary))?;

	let impl_config = config
		.ledger
		.implementations
		.get(&config.ledger.primary)
		.ok_or_else(|| {
			format!(
				"missing configuration for ledger implementation '{}'",
				config.ledger.primary
			)
		})?;

	Ok(factory(impl_config)?)
}
