use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Maximum packs a user may open per calendar day
pub const DAILY_PACK_LIMIT: u32 = 5;

/// Per-user counter of packs opened on a given date. Exclusively owned
/// and mutated by the tracker.
#[derive(Debug, Clone)]
pub struct DailyLimitRecord {
    pub date: NaiveDate,
    pub packs_opened: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyLimitStatus {
    pub date: NaiveDate,
    pub packs_opened: u32,
    pub packs_remaining: u32,
    pub can_open: bool,
}

/// Tracks per-user daily pack-open counts with automatic day rollover.
///
/// Correctness rests on the date-equality check at read time alone; the
/// periodic sweep only bounds memory. State is process-local, so a
/// horizontally scaled deployment needs sticky routing or a shared store.
pub struct DailyLimitTracker {
    records: Mutex<HashMap<String, DailyLimitRecord>>,
}

impl Default for DailyLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyLimitTracker {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Today's allowance for a user. A record carrying a stale date reads
    /// as zero opens; it is logically replaced on the next `record`.
    #[instrument(skip(self))]
    pub fn status(&self, user_id: &str) -> DailyLimitStatus {
        self.status_on(user_id, Utc::now().date_naive())
    }

    /// Counts one opened pack against today, lazily creating (or
    /// replacing a stale) record.
    #[instrument(skip(self))]
    pub fn record(&self, user_id: &str) {
        self.record_on(user_id, Utc::now().date_naive());
    }

    /// Drops every record whose date is not today. Run out of band to
    /// bound memory; never required for correctness.
    #[instrument(skip(self))]
    pub fn sweep(&self) -> usize {
        self.sweep_on(Utc::now().date_naive())
    }

    /// Number of records currently held (stale ones included)
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn status_on(&self, user_id: &str, today: NaiveDate) -> DailyLimitStatus {
        let records = self.records.lock().unwrap();
        let packs_opened = records
            .get(user_id)
            .filter(|r| r.date == today)
            .map(|r| r.packs_opened)
            .unwrap_or(0);
        let packs_remaining = DAILY_PACK_LIMIT.saturating_sub(packs_opened);

        DailyLimitStatus {
            date: today,
            packs_opened,
            packs_remaining,
            can_open: packs_remaining > 0,
        }
    }

    fn record_on(&self, user_id: &str, today: NaiveDate) {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id.to_string())
            .or_insert(DailyLimitRecord {
                date: today,
                packs_opened: 0,
            });

        // Day rolled over since the last touch: replace, don't carry over
        if record.date != today {
            record.date = today;
            record.packs_opened = 0;
        }
        record.packs_opened += 1;

        debug!(
            user_id = %user_id,
            packs_opened = record.packs_opened,
            "Recorded pack open"
        );
    }

    fn sweep_on(&self, today: NaiveDate) -> usize {
        let mut records = self.records.lock().unwrap();
        let initial_count = records.len();
        records.retain(|_, record| record.date == today);

        let removed = initial_count - records.len();
        debug!(removed = removed, "Stale daily limit records swept");
        removed
    }
}
