//! Core monitoring engine for the transaction watcher.
//!
//! This module provides the transaction confirmation monitor: a bounded
//! polling loop that queries a ledger status provider until a submitted
//! transaction reaches a terminal state or a wall-clock deadline elapses.
//! Progress is published to a broadcast event bus so that consumers can
//! observe sessions without affecting them.

pub mod event_bus;
pub mod monitor;

pub use event_bus::EventBus;
pub use monitor::{MonitorError, TransactionMonitor, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
