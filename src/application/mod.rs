pub mod dispatcher;
pub mod monitor;

pub use dispatcher::{AlertDispatcher, AlertFormat};
pub use monitor::{
    CycleOutcome, LiquidityMonitor, MonitorError, MonitorSettings, MonitorStatus, StopHandle,
};
