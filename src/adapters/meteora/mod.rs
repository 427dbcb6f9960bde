//! Meteora Adapter
//!
//! Pool listing source backed by the Meteora DLMM public API
//! (`GET /pair/all`). Implements [`crate::ports::PoolSource`].

mod client;

pub use client::{MeteoraClient, MeteoraConfig, DEFAULT_PAIRS_URL};
