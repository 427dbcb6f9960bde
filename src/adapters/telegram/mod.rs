//! Telegram Adapter
//!
//! Alert delivery through the Telegram Bot API, plus the log-only
//! fallback used when no credentials are configured.

mod client;

pub use client::{LogNotifier, TelegramConfig, TelegramNotifier, TELEGRAM_API_BASE};
