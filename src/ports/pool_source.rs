use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PoolRecord;

/// Pool listing fetch error type
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode listing: {0}")]
    Decode(String),

    #[error("Listing was empty")]
    EmptyListing,

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::HttpStatus(status) => *status == 429 || *status >= 500,
            FetchError::Transport(_) | FetchError::EmptyListing => true,
            FetchError::Decode(_) => true,
            FetchError::RetriesExhausted { .. } => false,
        }
    }
}

/// Source of the full pool listing
///
/// Implementations retry internally; an `Err` means every attempt failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Fetch every pool currently listed
    async fn fetch_pools(&self) -> Result<Vec<PoolRecord>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(FetchError::HttpStatus(503).is_retryable());
        assert!(FetchError::HttpStatus(429).is_retryable());
        assert!(!FetchError::HttpStatus(404).is_retryable());
        assert!(FetchError::Transport("timed out".into()).is_retryable());
        assert!(FetchError::EmptyListing.is_retryable());
        assert!(!FetchError::RetriesExhausted {
            attempts: 3,
            last: Box::new(FetchError::EmptyListing),
        }
        .is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::RetriesExhausted {
            attempts: 3,
            last: Box::new(FetchError::HttpStatus(502)),
        };
        assert_eq!(err.to_string(), "Gave up after 3 attempts: HTTP status 502");
    }
}
