//! Liquidity Monitor
//!
//! Poll cycle driver. Seeds the historical set from a startup listing,
//! then on every cycle fetches the listing, aggregates it, advances the
//! tracker and dispatches graduation alerts.
//!
//! The tracker is owned here and only mutated from `run_cycle`, so a cycle
//! always completes its detection/resolution pass before anything else can
//! observe tracker state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;

use crate::config::Config;
use crate::domain::{aggregate, CycleReport, PoolRecord, Thresholds, TokenTracker};
use crate::ports::{FetchError, Notifier, PoolSource};

use super::dispatcher::{AlertDispatcher, AlertFormat};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Cycle attempted before the historical set was seeded")]
    NotBootstrapped,
    #[error("Stopped before bootstrap completed")]
    Stopped,
    #[error("Cycle task failed: {0}")]
    CycleFault(String),
}

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorSettings {
    /// Pause between cycles
    pub check_interval: Duration,
    /// Pause between failed startup fetches
    pub bootstrap_retry: Duration,
    /// Pause after an unexpected cycle error
    pub error_backoff: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            bootstrap_retry: Duration::from_secs(30),
            error_backoff: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        Self {
            check_interval: config.check_interval(),
            bootstrap_retry: config.bootstrap_retry(),
            error_backoff: config.error_backoff(),
        }
    }
}

/// Result of one steady-state cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Listing fetched and tracker advanced
    Completed(CycleReport),
    /// No usable listing; tracker left untouched
    Skipped { cycle: u64, reason: String },
}

/// Cloneable stop signal shared with the Ctrl+C task
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn new() -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Request shutdown; interrupts any pending sleep
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wake.notify_one();
        tracing::info!("Stop signal sent to monitor");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Status snapshot of the monitor
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStatus {
    pub is_running: bool,
    pub bootstrapped: bool,
    pub cycle: u64,
    pub tracked: usize,
    pub historical: usize,
}

/// Poll cycle driver
pub struct LiquidityMonitor {
    source: Arc<dyn PoolSource>,
    dispatcher: AlertDispatcher,
    tracker: TokenTracker,
    settings: MonitorSettings,
    cycle: u64,
    bootstrapped: bool,
    stop: StopHandle,
}

impl LiquidityMonitor {
    pub fn new(
        source: Arc<dyn PoolSource>,
        dispatcher: AlertDispatcher,
        tracker: TokenTracker,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            dispatcher,
            tracker,
            settings,
            cycle: 0,
            bootstrapped: false,
            stop: StopHandle::new(),
        }
    }

    /// Build a monitor from loaded configuration
    pub fn from_config(
        config: &Config,
        source: Arc<dyn PoolSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, MonitorError> {
        let tracker = TokenTracker::new(Thresholds::from(config))
            .map_err(|e| MonitorError::ConfigError(e.to_string()))?;

        let format = if config.telegram.include_metrics {
            AlertFormat::Detailed
        } else {
            AlertFormat::MintOnly
        };
        let dispatcher = AlertDispatcher::new(notifier, format);

        Ok(Self::new(source, dispatcher, tracker, MonitorSettings::from(config)))
    }

    /// Use an externally created stop handle
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for stopping the loop from another task
    pub fn handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            is_running: !self.stop.is_stopped(),
            bootstrapped: self.bootstrapped,
            cycle: self.cycle,
            tracked: self.tracker.tracked_count(),
            historical: self.tracker.historical_count(),
        }
    }

    /// Seed the historical set from the current listing, retrying until a
    /// usable listing arrives or the monitor is stopped.
    pub async fn bootstrap(&mut self) -> Result<usize, MonitorError> {
        tracing::info!("Loading existing tokens...");

        loop {
            if self.stop.is_stopped() {
                return Err(MonitorError::Stopped);
            }

            match self.fetch_contained().await {
                Ok(Ok(records)) => {
                    let snapshot = aggregate(&records);
                    if !snapshot.is_empty() {
                        let seeded = self.tracker.seed_history(&snapshot);
                        self.bootstrapped = true;
                        tracing::info!(
                            "{} existing tokens loaded from {} pools",
                            self.tracker.historical_count(),
                            snapshot.pool_count
                        );
                        return Ok(seeded);
                    }
                    tracing::warn!("Startup listing contained no tokens");
                }
                Ok(Err(e)) => tracing::warn!("Startup listing fetch failed: {}", e),
                Err(e) => tracing::error!("Startup listing fetch failed: {}", e),
            }

            tracing::warn!(
                "Failed to load existing tokens, retrying in {:?}",
                self.settings.bootstrap_retry
            );
            if self.pause(self.settings.bootstrap_retry).await {
                return Err(MonitorError::Stopped);
            }
        }
    }

    /// Execute one polling cycle
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        if !self.bootstrapped {
            return Err(MonitorError::NotBootstrapped);
        }

        self.cycle += 1;
        let cycle = self.cycle;

        let records = match self.fetch_contained().await? {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                return Ok(CycleOutcome::Skipped {
                    cycle,
                    reason: "empty listing".to_string(),
                })
            }
            Err(e) => {
                return Ok(CycleOutcome::Skipped {
                    cycle,
                    reason: e.to_string(),
                })
            }
        };

        let snapshot = aggregate(&records);
        let report = self.tracker.advance(&snapshot, cycle);

        if !report.graduated.is_empty() {
            let dispatcher = self.dispatcher.clone();
            let graduated = report.graduated.clone();
            tokio::spawn(async move { dispatcher.dispatch_all(&graduated).await })
                .await
                .map_err(|e| MonitorError::CycleFault(format!("alert delivery: {}", e)))?;
        }

        Ok(CycleOutcome::Completed(report))
    }

    /// Fetch on a separate task; a panic in the source surfaces as `CycleFault`
    async fn fetch_contained(&self) -> Result<Result<Vec<PoolRecord>, FetchError>, MonitorError> {
        let source = Arc::clone(&self.source);
        tokio::spawn(async move { source.fetch_pools().await })
            .await
            .map_err(|e| MonitorError::CycleFault(format!("pool fetch: {}", e)))
    }

    /// Bootstrap, then poll until stopped
    pub async fn run(&mut self) -> Result<(), MonitorError> {
        let thresholds = *self.tracker.thresholds();
        tracing::info!(
            "Monitoring active - liquidity >= ${:.0}, volume >= ${:.0}, window {} loops, interval {:?}, alerts via {}",
            thresholds.min_liquidity,
            thresholds.min_volume,
            thresholds.max_loops,
            self.settings.check_interval,
            self.dispatcher.channel()
        );

        match self.bootstrap().await {
            Ok(_) => {}
            Err(MonitorError::Stopped) => {
                tracing::info!("Stopped during startup");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        while !self.stop.is_stopped() {
            let pause = match self.run_cycle().await {
                Ok(CycleOutcome::Completed(report)) => {
                    log_report(&report);
                    self.settings.check_interval
                }
                Ok(CycleOutcome::Skipped { cycle, reason }) => {
                    tracing::warn!("Cycle {} skipped: {}", cycle, reason);
                    self.settings.check_interval
                }
                Err(e) => {
                    tracing::error!("Cycle error: {}", e);
                    self.settings.error_backoff
                }
            };

            if self.pause(pause).await {
                break;
            }
        }

        tracing::info!("Liquidity monitor stopped after {} cycles", self.cycle);
        Ok(())
    }

    /// Sleep unless stopped. Returns true if the monitor should stop.
    async fn pause(&self, duration: Duration) -> bool {
        if self.stop.is_stopped() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.stop.wake.notified() => {}
        }
        self.stop.is_stopped()
    }
}

fn log_report(report: &CycleReport) {
    tracing::info!(
        "Cycle {} | new: {} | tracked: {} | graduated: {} | expired: {}",
        report.cycle,
        report.new_listings.len(),
        report.tracked_count(),
        report.graduated.len(),
        report.expired.len()
    );

    for status in &report.watching {
        tracing::debug!(
            "  {} | liquidity ${:.2} (best ${:.2}) | volume ${:.2} (best ${:.2}) | pools {} | loops left {}",
            status.mint,
            status.current_liquidity,
            status.best_liquidity,
            status.current_volume,
            status.best_volume,
            status.pool_count,
            status.remaining_loops
        );
    }

    if report.graduated.is_empty() {
        tracing::info!("No new validated tokens");
    }
    for graduation in &report.graduated {
        tracing::info!(
            "TOKEN VALIDATED: {} | best liquidity ${:.2} | best volume ${:.2} | pools {}",
            graduation.mint,
            graduation.best_liquidity,
            graduation.best_volume,
            graduation.pool_count
        );
    }
}
