//! The channel log service.

use crate::domain::{ChannelLogError, LogEnvelope, TopicIndex};
use crate::ports::{AppendResult, ContentStore, ContentStoreError};
use rl_02_entry_retry::{EntryReadError, FailedEntry, RetryTracker, TimeSource};
use shared_types::{hash_to_hex, Hash, PersistedEntry, SignedAction, TimestampBoundaries};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Tunables for the channel log.
#[derive(Debug, Clone)]
pub struct ChannelLogConfig {
    /// Upper bound on concurrent content-store reads per query.
    pub max_concurrent_fetches: usize,
}

impl Default for ChannelLogConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 5,
        }
    }
}

/// Outcome of one synchronization pass over the raw store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub entries_indexed: usize,
    pub entries_ignored: usize,
    pub last_timestamp: u64,
}

/// Topic-indexed log of signed transactions over a content store.
///
/// Writes wrap the transaction in a [`LogEnvelope`] carrying its hashed
/// topics, so the index is always reconstructible from the raw store.
/// Reads fetch with bounded fan-out; a failed fetch is handed to the
/// retry tracker and excluded from the result, never aborting the query.
pub struct ChannelLog<S, T>
where
    S: ContentStore + 'static,
    T: TimeSource + 'static,
{
    store: Arc<S>,
    retry: Arc<RetryTracker<T>>,
    index: TopicIndex,
    /// (location, reason) for entries that failed envelope parsing.
    ignored: Mutex<Vec<(String, String)>>,
    last_sync_timestamp: AtomicU64,
    config: ChannelLogConfig,
}

impl<S, T> ChannelLog<S, T>
where
    S: ContentStore + 'static,
    T: TimeSource + 'static,
{
    pub fn new(store: Arc<S>, retry: Arc<RetryTracker<T>>, config: ChannelLogConfig) -> Self {
        Self {
            store,
            retry,
            index: TopicIndex::new(),
            ignored: Mutex::new(Vec::new()),
            last_sync_timestamp: AtomicU64::new(0),
            config,
        }
    }

    /// Persist a transaction under every given topic.
    pub async fn persist(
        &self,
        transaction: SignedAction,
        topics: &[Hash],
    ) -> Result<AppendResult, ChannelLogError> {
        let envelope = LogEnvelope::new(transaction, topics.to_vec());
        let content = envelope.to_json()?;
        let result = self.store.append(content).await?;

        for topic in topics {
            self.index.add(*topic, result.id);
        }
        debug!(
            "[rl-03] persisted entry {} under {} topic(s)",
            hash_to_hex(&result.id),
            topics.len()
        );
        Ok(result)
    }

    /// All readable entries for a topic, ascending by `(timestamp, id)`.
    ///
    /// Ids whose last fetch failed stay invisible until their backoff
    /// window elapses; ids that fail now are recorded for later retry.
    /// The result order is deterministic regardless of fetch completion
    /// order.
    pub async fn entries_by_topic(
        &self,
        topic: &Hash,
        boundaries: Option<TimestampBoundaries>,
    ) -> Vec<PersistedEntry> {
        let ids: Vec<Hash> = self
            .index
            .ids_for(topic)
            .into_iter()
            .filter(|id| self.retry.get(id).is_none() || self.retry.should_retry(id))
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut fetches = JoinSet::new();
        for id in ids {
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            fetches.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            id,
                            Err(ContentStoreError::Unreachable("fetch pool closed".into())),
                        )
                    }
                };
                (id, store.read(&id).await)
            });
        }

        let mut entries = Vec::new();
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((id, Ok(entry))) => {
                    self.retry.delete(&id);
                    entries.push(entry);
                }
                Ok((id, Err(error))) => {
                    debug!(
                        "[rl-03] fetch of entry {} failed: {}",
                        hash_to_hex(&id),
                        error
                    );
                    self.retry.save(FailedEntry {
                        id,
                        error: read_error(error),
                    });
                }
                Err(join_error) => {
                    warn!("[rl-03] fetch task failed: {join_error}");
                }
            }
        }

        if let Some(boundaries) = boundaries {
            entries.retain(|entry| boundaries.contains(entry.meta.timestamp));
        }
        entries.sort_by(|a, b| {
            a.meta
                .timestamp
                .cmp(&b.meta.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    /// Build the topic index from everything the store holds.
    pub async fn initialize(&self) -> Result<SyncReport, ChannelLogError> {
        self.synchronize(TimestampBoundaries::default()).await
    }

    /// Pull entries within `boundaries` from the store and extend the
    /// topic index with them.
    ///
    /// Entries that fail envelope parsing land on the ignored list with
    /// their reason; they never abort the pass.
    pub async fn synchronize(
        &self,
        boundaries: TimestampBoundaries,
    ) -> Result<SyncReport, ChannelLogError> {
        let snapshot = self.store.get_data(boundaries).await?;

        let mut entries_indexed = 0;
        let mut entries_ignored = 0;
        for entry in &snapshot.entries {
            match LogEnvelope::parse(&entry.content) {
                Ok(envelope) => {
                    for topic in envelope.topics {
                        self.index.add(topic, entry.id);
                    }
                    entries_indexed += 1;
                }
                Err(error) => {
                    debug!(
                        "[rl-03] ignoring entry at {}: {}",
                        entry.meta.location, error
                    );
                    if let Ok(mut ignored) = self.ignored.lock() {
                        ignored.push((entry.meta.location.clone(), error.to_string()));
                    }
                    entries_ignored += 1;
                }
            }
        }

        // The store's own clock decides sync progress, never local now.
        self.last_sync_timestamp
            .store(snapshot.last_timestamp, Ordering::SeqCst);

        info!(
            "[rl-03] sync complete: {} indexed, {} ignored, last timestamp {}",
            entries_indexed, entries_ignored, snapshot.last_timestamp
        );
        Ok(SyncReport {
            entries_indexed,
            entries_ignored,
            last_timestamp: snapshot.last_timestamp,
        })
    }

    /// Locations skipped during synchronization, with reasons.
    pub fn ignored_locations(&self) -> Vec<(String, String)> {
        self.ignored
            .lock()
            .map(|ignored| ignored.clone())
            .unwrap_or_default()
    }

    pub fn last_sync_timestamp(&self) -> u64 {
        self.last_sync_timestamp.load(Ordering::SeqCst)
    }

    pub fn retry_tracker(&self) -> &Arc<RetryTracker<T>> {
        &self.retry
    }

    pub fn indexed_topic_count(&self) -> usize {
        self.index.topic_count()
    }
}

fn read_error(error: ContentStoreError) -> EntryReadError {
    match error {
        ContentStoreError::Unreachable(reason) => EntryReadError::Unreachable(reason),
        ContentStoreError::Timeout(ms) => EntryReadError::Timeout(ms),
        // A locally indexed id missing from an at-least-available store
        // usually means propagation lag; retry it.
        ContentStoreError::NotFound(id) => {
            EntryReadError::Unreachable(format!("entry {id} not yet available"))
        }
        ContentStoreError::ContentMismatch(_) => EntryReadError::IncorrectContent,
    }
}
