//! Alert Dispatcher
//!
//! Turns graduations into outbound messages. Delivery failures are logged
//! and reported back; the tracker has already resolved the mint, so nothing
//! is retried or re-tracked here.

use std::sync::Arc;

use crate::domain::Graduation;
use crate::ports::Notifier;

/// Message body layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFormat {
    /// Bare mint address (consumable by downstream bots)
    #[default]
    MintOnly,
    /// Mint plus best metrics
    Detailed,
}

/// Sends graduation alerts through a notifier
#[derive(Clone)]
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    format: AlertFormat,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, format: AlertFormat) -> Self {
        Self { notifier, format }
    }

    pub fn format(&self) -> AlertFormat {
        self.format
    }

    pub fn channel(&self) -> &'static str {
        self.notifier.name()
    }

    pub fn format_message(&self, graduation: &Graduation) -> String {
        match self.format {
            AlertFormat::MintOnly => graduation.mint.clone(),
            AlertFormat::Detailed => format!(
                "{}\nLiquidity: ${:.2}\nVolume 24h: ${:.2}\nPools: {}\nPrice: {}",
                graduation.mint,
                graduation.best_liquidity,
                graduation.best_volume,
                graduation.pool_count,
                graduation.latest_price
            ),
        }
    }

    /// Deliver one alert. Returns whether the channel accepted it.
    pub async fn dispatch(&self, graduation: &Graduation) -> bool {
        let message = self.format_message(graduation);

        match self.notifier.notify(&message).await {
            Ok(()) => {
                tracing::info!("[{}] Alert sent: {}", self.notifier.name(), graduation.mint);
                true
            }
            Err(e) => {
                tracing::error!(
                    "[{}] Alert for {} failed: {}",
                    self.notifier.name(),
                    graduation.mint,
                    e
                );
                false
            }
        }
    }

    /// Deliver every alert in order. Returns how many were accepted.
    pub async fn dispatch_all(&self, graduations: &[Graduation]) -> usize {
        let mut delivered = 0;
        for graduation in graduations {
            if self.dispatch(graduation).await {
                delivered += 1;
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockNotifier, NotifyError};
    use mockall::Sequence;

    fn graduation(mint: &str) -> Graduation {
        Graduation {
            mint: mint.to_string(),
            best_liquidity: 6_000.0,
            best_volume: 25_000.0,
            pool_count: 2,
            latest_price: 0.0042,
            cycles_tracked: 0,
        }
    }

    fn mock_notifier() -> MockNotifier {
        let mut mock = MockNotifier::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[test]
    fn test_mint_only_format() {
        let dispatcher = AlertDispatcher::new(Arc::new(mock_notifier()), AlertFormat::MintOnly);
        assert_eq!(dispatcher.format_message(&graduation("MintD")), "MintD");
    }

    #[test]
    fn test_detailed_format() {
        let dispatcher = AlertDispatcher::new(Arc::new(mock_notifier()), AlertFormat::Detailed);
        let message = dispatcher.format_message(&graduation("MintD"));

        assert!(message.starts_with("MintD\n"));
        assert!(message.contains("Liquidity: $6000.00"));
        assert!(message.contains("Volume 24h: $25000.00"));
        assert!(message.contains("Pools: 2"));
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut mock = mock_notifier();
        mock.expect_notify()
            .withf(|message| message.contains("MintD"))
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = AlertDispatcher::new(Arc::new(mock), AlertFormat::MintOnly);
        assert!(dispatcher.dispatch(&graduation("MintD")).await);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_reported_not_raised() {
        let mut mock = mock_notifier();
        mock.expect_notify()
            .times(1)
            .returning(|_| Err(NotifyError::Transport("connection reset".into())));

        let dispatcher = AlertDispatcher::new(Arc::new(mock), AlertFormat::MintOnly);
        assert!(!dispatcher.dispatch(&graduation("MintD")).await);
    }

    #[tokio::test]
    async fn test_dispatch_all_continues_after_failure() {
        let mut seq = Sequence::new();
        let mut mock = mock_notifier();
        mock.expect_notify()
            .withf(|message| message.contains("First"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(NotifyError::Rejected { status: 400, description: "chat not found".into() }));
        mock.expect_notify()
            .withf(|message| message.contains("Second"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let dispatcher = AlertDispatcher::new(Arc::new(mock), AlertFormat::MintOnly);
        let delivered = dispatcher
            .dispatch_all(&[graduation("First"), graduation("Second")])
            .await;

        assert_eq!(delivered, 1);
    }
}
