// Public API - what other modules can use
pub use sweep_task::{start_sweep_task, SweepConfig};
pub use tracker::{DailyLimitRecord, DailyLimitStatus, DailyLimitTracker, DAILY_PACK_LIMIT};

// Internal modules
mod sweep_task;
mod tracker;
