//! Listing Sentinel - New Token Liquidity Watcher
//!
//! Polls a DEX pair listing, tracks newly listed token mints for a bounded
//! window and alerts when their best observed liquidity and volume clear
//! the configured thresholds.
//!
//! # Modules
//!
//! - `domain`: Core logic (PoolRecord, aggregation, TokenTracker)
//! - `ports`: Trait abstractions (PoolSource, Notifier)
//! - `adapters`: External implementations (Meteora, Telegram, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Poll loop and alert dispatch

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
