//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The pool listing feed (fetch with bounded retry)
//! - The outbound alert channel (Telegram, log-only)

pub mod notifier;
pub mod pool_source;

pub use notifier::{Notifier, NotifyError};
pub use pool_source::{FetchError, PoolSource};

#[cfg(test)]
pub use notifier::MockNotifier;
#[cfg(test)]
pub use pool_source::MockPoolSource;
