//! Common types module for the transaction watcher.
//!
//! This module defines the core data types shared between the watcher
//! components. It provides a centralized location for shared types to
//! ensure consistency between the monitoring engine, the status providers,
//! and the service binary.

/// Event types published during monitoring sessions.
pub mod events;
/// Terminal outcomes of a monitoring session.
pub mod outcome;
/// Transaction identity and status types.
pub mod transaction;

// Re-export all types for convenient access
pub use events::*;
pub use outcome::*;
pub use transaction::*;
