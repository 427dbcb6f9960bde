//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Meteora: DLMM pair listing client
//! - Telegram: Bot API alert delivery (plus log-only fallback)
//! - CLI: Command-line interface handlers

pub mod meteora;
pub mod telegram;
pub mod cli;

pub use meteora::MeteoraClient;
pub use telegram::{LogNotifier, TelegramNotifier};
pub use cli::CliApp;
