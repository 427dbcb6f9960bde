//! Token Tracker
//!
//! State machine behind new-listing detection. Each mint is either
//! untracked (never seen, or already resolved into history) or tracked
//! with a [`TrackingRecord`]. A tracked mint leaves the table exactly once,
//! by graduating (alert) or expiring (silent drop), and then lives in the
//! historical set forever so it is never flagged as new again.
//!
//! Expiration window: the entry cycle is cycle 0 of the window. A mint
//! entering at cycle `c` expires at cycle `c + max_loops` unless it
//! graduates first.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::aggregator::PoolSnapshot;

/// Default minimum liquidity in USD
pub const DEFAULT_MIN_LIQUIDITY: f64 = 5_000.0;

/// Default minimum 24h volume in USD
pub const DEFAULT_MIN_VOLUME: f64 = 20_000.0;

/// Default tracking window in cycles
pub const DEFAULT_MAX_LOOPS: u64 = 5;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ThresholdError {
    #[error("min_liquidity must be finite and >= 0, got {0}")]
    InvalidLiquidity(f64),
    #[error("min_volume must be finite and >= 0, got {0}")]
    InvalidVolume(f64),
    #[error("max_loops must be > 0")]
    ZeroWindow,
}

/// Graduation thresholds and window length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_liquidity: f64,
    pub min_volume: f64,
    pub max_loops: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_liquidity: DEFAULT_MIN_LIQUIDITY,
            min_volume: DEFAULT_MIN_VOLUME,
            max_loops: DEFAULT_MAX_LOOPS,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if !self.min_liquidity.is_finite() || self.min_liquidity < 0.0 {
            return Err(ThresholdError::InvalidLiquidity(self.min_liquidity));
        }
        if !self.min_volume.is_finite() || self.min_volume < 0.0 {
            return Err(ThresholdError::InvalidVolume(self.min_volume));
        }
        if self.max_loops == 0 {
            return Err(ThresholdError::ZeroWindow);
        }
        Ok(())
    }

    /// Both thresholds met at once
    pub fn is_met(&self, liquidity: f64, volume: f64) -> bool {
        liquidity >= self.min_liquidity && volume >= self.min_volume
    }
}

/// Tracking state of one watched mint
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRecord {
    /// Highest liquidity observed since entry
    pub best_liquidity: f64,
    /// Highest volume observed since entry
    pub best_volume: f64,
    /// Cycle the mint was first detected
    pub entered_at_cycle: u64,
    /// Cycle at which the mint is dropped if still below thresholds
    pub expires_at_cycle: u64,
    /// Wall-clock time of detection
    pub added_at: DateTime<Utc>,
}

impl TrackingRecord {
    fn ratchet(&mut self, liquidity: f64, volume: f64) {
        self.best_liquidity = self.best_liquidity.max(liquidity);
        self.best_volume = self.best_volume.max(volume);
    }

    /// Cycles left before expiry (0 on the expiring cycle)
    pub fn remaining_loops(&self, current_cycle: u64) -> u64 {
        self.expires_at_cycle.saturating_sub(current_cycle)
    }
}

/// A tracked mint that crossed both thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct Graduation {
    pub mint: String,
    pub best_liquidity: f64,
    pub best_volume: f64,
    /// Pools carrying the mint this cycle
    pub pool_count: usize,
    /// Latest observed price this cycle
    pub latest_price: f64,
    /// Cycles spent in tracking, entry cycle counting as 0
    pub cycles_tracked: u64,
}

/// Per-cycle view of a mint that remains tracked
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedStatus {
    pub mint: String,
    pub current_liquidity: f64,
    pub best_liquidity: f64,
    pub current_volume: f64,
    pub best_volume: f64,
    pub pool_count: usize,
    pub remaining_loops: u64,
}

/// Everything one `advance` call decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    /// Mints that entered tracking this cycle
    pub new_listings: Vec<String>,
    /// Mints that graduated this cycle, in table order
    pub graduated: Vec<Graduation>,
    /// Mints dropped without alert this cycle
    pub expired: Vec<String>,
    /// Mints still tracked after this cycle
    pub watching: Vec<TrackedStatus>,
}

impl CycleReport {
    pub fn tracked_count(&self) -> usize {
        self.watching.len()
    }
}

/// Owns the historical set and the tracking table
#[derive(Debug, Clone)]
pub struct TokenTracker {
    thresholds: Thresholds,
    historical: HashSet<String>,
    tracked: BTreeMap<String, TrackingRecord>,
}

impl TokenTracker {
    pub fn new(thresholds: Thresholds) -> Result<Self, ThresholdError> {
        thresholds.validate()?;
        Ok(Self {
            thresholds,
            historical: HashSet::new(),
            tracked: BTreeMap::new(),
        })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Mark every mint in the snapshot as already known.
    /// Returns how many mints were added to history.
    pub fn seed_history(&mut self, snapshot: &PoolSnapshot) -> usize {
        let before = self.historical.len();
        for mint in snapshot.mints() {
            if !self.tracked.contains_key(mint) {
                self.historical.insert(mint.to_string());
            }
        }
        self.historical.len() - before
    }

    pub fn is_historical(&self, mint: &str) -> bool {
        self.historical.contains(mint)
    }

    pub fn is_tracked(&self, mint: &str) -> bool {
        self.tracked.contains_key(mint)
    }

    pub fn record(&self, mint: &str) -> Option<&TrackingRecord> {
        self.tracked.get(mint)
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn historical_count(&self) -> usize {
        self.historical.len()
    }

    pub fn tracked_mints(&self) -> impl Iterator<Item = &str> {
        self.tracked.keys().map(String::as_str)
    }

    /// Run one cycle of detection, ratcheting and resolution
    pub fn advance(&mut self, snapshot: &PoolSnapshot, current_cycle: u64) -> CycleReport {
        let mut report = CycleReport {
            cycle: current_cycle,
            ..Default::default()
        };

        let mut new_mints: Vec<&str> = snapshot
            .mints()
            .filter(|mint| !self.historical.contains(*mint) && !self.tracked.contains_key(*mint))
            .collect();
        new_mints.sort_unstable();

        let now = Utc::now();
        for mint in new_mints {
            // Present in the snapshot by construction
            let (liquidity, volume) = snapshot
                .get(mint)
                .map(|agg| (agg.liquidity, agg.volume))
                .unwrap_or_default();

            self.tracked.insert(
                mint.to_string(),
                TrackingRecord {
                    best_liquidity: liquidity,
                    best_volume: volume,
                    entered_at_cycle: current_cycle,
                    expires_at_cycle: current_cycle + self.thresholds.max_loops,
                    added_at: now,
                },
            );
            tracing::info!("New token under watch: {}", mint);
            report.new_listings.push(mint.to_string());
        }

        let mints: Vec<String> = self.tracked.keys().cloned().collect();
        for mint in mints {
            let aggregate = snapshot.get(&mint);
            let current_liquidity = aggregate.map(|a| a.liquidity).unwrap_or(0.0);
            let current_volume = aggregate.map(|a| a.volume).unwrap_or(0.0);
            let pool_count = aggregate.map(|a| a.pool_count()).unwrap_or(0);
            let latest_price = aggregate.map(|a| a.latest_price).unwrap_or(0.0);

            let Some(record) = self.tracked.get_mut(&mint) else {
                continue;
            };
            record.ratchet(current_liquidity, current_volume);

            if self.thresholds.is_met(record.best_liquidity, record.best_volume) {
                let graduation = Graduation {
                    mint: mint.clone(),
                    best_liquidity: record.best_liquidity,
                    best_volume: record.best_volume,
                    pool_count,
                    latest_price,
                    cycles_tracked: current_cycle.saturating_sub(record.entered_at_cycle),
                };
                self.resolve(&mint);
                report.graduated.push(graduation);
            } else if current_cycle >= record.expires_at_cycle {
                tracing::info!(
                    "Token expired: {} (best liquidity ${:.2}, best volume ${:.2})",
                    mint,
                    record.best_liquidity,
                    record.best_volume
                );
                self.resolve(&mint);
                report.expired.push(mint);
            } else {
                report.watching.push(TrackedStatus {
                    mint: mint.clone(),
                    current_liquidity,
                    best_liquidity: record.best_liquidity,
                    current_volume,
                    best_volume: record.best_volume,
                    pool_count,
                    remaining_loops: record.remaining_loops(current_cycle),
                });
            }
        }

        report
    }

    /// Move a mint from the tracking table into history
    fn resolve(&mut self, mint: &str) {
        self.tracked.remove(mint);
        self.historical.insert(mint.to_string());
    }
}
