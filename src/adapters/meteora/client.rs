//! Meteora DLMM API Client
//!
//! HTTP client for the public DLMM pair listing.
//! Fetches every pair in one GET and retries transient failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::domain::{decode_listing, PoolRecord};
use crate::ports::{FetchError, PoolSource};

/// Public endpoint listing every DLMM pair
pub const DEFAULT_PAIRS_URL: &str = "https://dlmm-api.meteora.ag/pair/all";

/// Meteora client configuration
#[derive(Debug, Clone)]
pub struct MeteoraConfig {
    /// Pair listing URL
    pub pairs_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts per fetch
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl Default for MeteoraConfig {
    fn default() -> Self {
        Self {
            pairs_url: DEFAULT_PAIRS_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Meteora DLMM listing client
#[derive(Debug, Clone)]
pub struct MeteoraClient {
    config: MeteoraConfig,
    http: Client,
}

impl MeteoraClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(MeteoraConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: MeteoraConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// One GET of the listing, no retry
    pub async fn fetch_once(&self) -> Result<Vec<PoolRecord>, FetchError> {
        let response = self.http
            .get(&self.config.pairs_url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let entries: Vec<Value> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        records_from_entries(entries)
    }

    /// Fetch with bounded retry and a fixed delay between attempts.
    /// Non-retryable errors end the loop early.
    async fn fetch_with_retry(&self) -> Result<Vec<PoolRecord>, FetchError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts_made = 0;
        let mut last_error = None;

        while attempts_made < max_attempts {
            attempts_made += 1;
            match self.fetch_once().await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    tracing::warn!(
                        "Pool listing fetch failed (attempt {}/{}): {}",
                        attempts_made, max_attempts, e
                    );
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                    if attempts_made < max_attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            attempts: attempts_made,
            last: Box::new(last_error.unwrap_or(FetchError::EmptyListing)),
        })
    }

    /// Get the configured listing URL
    pub fn pairs_url(&self) -> &str {
        &self.config.pairs_url
    }
}

/// Turn raw listing entries into records, rejecting an empty listing
pub(crate) fn records_from_entries(entries: Vec<Value>) -> Result<Vec<PoolRecord>, FetchError> {
    if entries.is_empty() {
        return Err(FetchError::EmptyListing);
    }

    let (records, skipped) = decode_listing(entries);
    if skipped > 0 {
        tracing::warn!("Skipped {} undecodable pool entries", skipped);
    }
    if records.is_empty() {
        return Err(FetchError::Decode("no pool-shaped entries in listing".into()));
    }
    Ok(records)
}

#[async_trait]
impl PoolSource for MeteoraClient {
    async fn fetch_pools(&self) -> Result<Vec<PoolRecord>, FetchError> {
        let records = self.fetch_with_retry().await?;
        tracing::debug!("Fetched {} pools from {}", records.len(), self.config.pairs_url);
        Ok(records)
    }
}
