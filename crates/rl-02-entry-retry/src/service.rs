//! The retry tracker.

use crate::domain::{FailedEntry, RetryRecord};
use crate::ports::TimeSource;
use shared_types::{hash_to_hex, Hash};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::debug;

/// Base retry interval in milliseconds; the n-th retry waits n² times this.
pub const BASE_RETRY_INTERVAL_MS: u64 = 60_000;

/// Tracks entries that failed to load and schedules their retries.
///
/// A transient failure is retried once its backoff window elapses, with
/// the window growing quadratically in the attempt count. A permanent
/// failure is recorded once and never touched again, so repeated reports
/// of a known-bad entry cannot reset or grow its record.
///
/// Each record sits behind its own lock; the outer map lock only guards
/// the map's shape, so bookkeeping for one entry never blocks another.
pub struct RetryTracker<T: TimeSource> {
    records: RwLock<HashMap<Hash, Mutex<RetryRecord>>>,
    /// Ids in first-seen order, for stable listing.
    order: Mutex<Vec<Hash>>,
    clock: T,
}

impl<T: TimeSource> RetryTracker<T> {
    pub fn new(clock: T) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            order: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Record a failed read attempt.
    ///
    /// First report creates the record; later reports bump the iteration
    /// and reset the backoff clock, unless the record is permanent.
    pub fn save(&self, entry: FailedEntry) {
        let now = self.clock.now_millis();

        if let Ok(records) = self.records.read() {
            if let Some(slot) = records.get(&entry.id) {
                if let Ok(mut record) = slot.lock() {
                    if record.to_retry {
                        record.iteration += 1;
                        record.last_try_timestamp = now;
                        // A permanent failure on a retry ends the schedule.
                        record.to_retry = entry.error.is_transient();
                        record.entry = entry;
                        debug!(
                            "[rl-02] retry {} for entry {} rescheduled",
                            record.iteration,
                            hash_to_hex(&record.entry.id)
                        );
                    }
                }
                return;
            }
        }

        let id = entry.id;
        let to_retry = entry.error.is_transient();
        let record = RetryRecord {
            entry,
            iteration: 1,
            last_try_timestamp: now,
            to_retry,
        };

        if let Ok(mut records) = self.records.write() {
            // Another writer may have inserted between the read and write
            // lock; the first record wins.
            if records.contains_key(&id) {
                drop(records);
                return;
            }
            records.insert(id, Mutex::new(record));
        }
        if let Ok(mut order) = self.order.lock() {
            order.push(id);
        }
        debug!(
            "[rl-02] entry {} marked {}",
            hash_to_hex(&id),
            if to_retry { "for retry" } else { "permanently failed" }
        );
    }

    /// Forget an entry, typically after a successful read.
    pub fn delete(&self, id: &Hash) {
        let removed = self
            .records
            .write()
            .map(|mut records| records.remove(id).is_some())
            .unwrap_or(false);
        if removed {
            if let Ok(mut order) = self.order.lock() {
                order.retain(|known| known != id);
            }
            debug!("[rl-02] entry {} cleared", hash_to_hex(id));
        }
    }

    /// Whether the entry's backoff window has elapsed.
    ///
    /// Untracked ids return false; they need no retry because they never
    /// failed.
    pub fn should_retry(&self, id: &Hash) -> bool {
        let now = self.clock.now_millis();
        self.with_record(id, |record| Self::eligible(record, now))
            .unwrap_or(false)
    }

    /// Snapshot of one record.
    pub fn get(&self, id: &Hash) -> Option<RetryRecord> {
        self.with_record(id, |record| record.clone())
    }

    /// All tracked ids, in first-seen order.
    pub fn data_ids(&self) -> Vec<Hash> {
        self.order.lock().map(|order| order.clone()).unwrap_or_default()
    }

    /// Tracked ids whose backoff window has elapsed, in first-seen order.
    pub fn data_ids_to_retry(&self) -> Vec<Hash> {
        let now = self.clock.now_millis();
        self.data_ids()
            .into_iter()
            .filter(|id| {
                self.with_record(id, |record| Self::eligible(record, now))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All tracked ids paired with a human-readable failure reason.
    pub fn data_ids_with_reasons(&self) -> Vec<(Hash, String)> {
        self.data_ids()
            .into_iter()
            .filter_map(|id| {
                self.with_record(&id, |record| record.entry.error.to_string())
                    .map(|reason| (id, reason))
            })
            .collect()
    }

    fn eligible(record: &RetryRecord, now: u64) -> bool {
        if !record.to_retry {
            return false;
        }
        let backoff = (record.iteration as u64)
            .saturating_mul(record.iteration as u64)
            .saturating_mul(BASE_RETRY_INTERVAL_MS);
        now >= record.last_try_timestamp.saturating_add(backoff)
    }

    fn with_record<R>(&self, id: &Hash, f: impl FnOnce(&RetryRecord) -> R) -> Option<R> {
        let records = self.records.read().ok()?;
        let slot = records.get(id)?;
        let record = slot.lock().ok()?;
        Some(f(&record))
    }
}
