use async_trait::async_trait;
use thiserror::Error;

/// Notification delivery error type
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Channel rejected message ({status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// Outbound alert channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs
    fn name(&self) -> &'static str;

    /// Deliver one message
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
