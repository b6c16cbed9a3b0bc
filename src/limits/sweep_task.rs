use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, instrument};

use super::tracker::DailyLimitTracker;

/// Configuration for the daily limit sweep task
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to sweep stale records
    pub sweep_interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Starts the background task that periodically drops stale daily limit
/// records. Purely a memory bound; the tracker stays correct without it.
#[instrument(skip(tracker))]
pub async fn start_sweep_task(tracker: Arc<DailyLimitTracker>, config: SweepConfig) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Starting daily limit sweep background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);

    loop {
        sweep_interval.tick().await;

        let removed = tracker.sweep();
        info!(removed = removed, "Daily limit sweep completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_task_runs_periodically() {
        let tracker = Arc::new(DailyLimitTracker::new());
        tracker.record("user-1");

        let config = SweepConfig {
            sweep_interval: Duration::from_millis(10),
        };
        let handle = tokio::spawn(start_sweep_task(Arc::clone(&tracker), config));

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        // Today's record is never swept; the task only drops stale dates
        assert_eq!(tracker.record_count(), 1);
        assert_eq!(tracker.status("user-1").packs_opened, 1);
    }
}
