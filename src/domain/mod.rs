//! Domain Layer - Core listing-detection logic
//!
//! Pure types and logic with no I/O. All external interactions happen
//! through the ports layer.
//!
//! - `pool`: lenient decoding of raw listing entries
//! - `aggregator`: per-mint folding of pool metrics
//! - `tracker`: new-listing state machine (graduation / expiration)

pub mod aggregator;
pub mod pool;
pub mod tracker;

pub use aggregator::{aggregate, PoolSnapshot, TokenAggregate};
pub use pool::{decode_listing, parse_metric, MetricParseError, PoolField, PoolRecord};
pub use tracker::{
    CycleReport, Graduation, ThresholdError, Thresholds, TokenTracker, TrackedStatus,
    TrackingRecord,
};
