//! Reference in-memory content store.

use crate::ports::{AppendResult, ContentStore, ContentStoreError, StoreSnapshot};
use async_trait::async_trait;
use rl_02_entry_retry::TimeSource;
use shared_crypto::keccak256;
use shared_types::{hash_to_hex, EntryMetadata, Hash, PersistedEntry, TimestampBoundaries};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Dictionary-backed content store for tests and local scenarios.
///
/// Content-addressed: the id is the Keccak-256 of the content, so
/// appending identical content twice yields the same entry. Timestamps
/// come from the injected clock.
pub struct InMemoryContentStore {
    entries: RwLock<HashMap<Hash, (String, EntryMetadata)>>,
    order: Mutex<Vec<Hash>>,
    clock: Arc<dyn TimeSource>,
}

impl InMemoryContentStore {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            order: Mutex::new(Vec::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn unreachable_lock() -> ContentStoreError {
        ContentStoreError::Unreachable("store lock poisoned".into())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn append(&self, content: String) -> Result<AppendResult, ContentStoreError> {
        let id = keccak256(content.as_bytes());

        let mut entries = self.entries.write().map_err(|_| Self::unreachable_lock())?;
        if let Some((_, meta)) = entries.get(&id) {
            // Same content, same id: the original entry stands.
            return Ok(AppendResult {
                id,
                meta: meta.clone(),
            });
        }

        let meta = EntryMetadata {
            timestamp: self.clock.now_secs(),
            location: hash_to_hex(&id),
        };
        entries.insert(id, (content, meta.clone()));
        drop(entries);

        if let Ok(mut order) = self.order.lock() {
            order.push(id);
        }
        Ok(AppendResult { id, meta })
    }

    async fn read(&self, id: &Hash) -> Result<PersistedEntry, ContentStoreError> {
        let entries = self.entries.read().map_err(|_| Self::unreachable_lock())?;
        let (content, meta) = entries
            .get(id)
            .ok_or_else(|| ContentStoreError::NotFound(hash_to_hex(id)))?;
        Ok(PersistedEntry {
            id: *id,
            content: content.clone(),
            meta: meta.clone(),
        })
    }

    async fn read_many(&self, ids: &[Hash]) -> Result<Vec<PersistedEntry>, ContentStoreError> {
        let entries = self.entries.read().map_err(|_| Self::unreachable_lock())?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                entries.get(id).map(|(content, meta)| PersistedEntry {
                    id: *id,
                    content: content.clone(),
                    meta: meta.clone(),
                })
            })
            .collect())
    }

    async fn get_data(
        &self,
        boundaries: TimestampBoundaries,
    ) -> Result<StoreSnapshot, ContentStoreError> {
        let order = self
            .order
            .lock()
            .map(|order| order.clone())
            .map_err(|_| Self::unreachable_lock())?;
        let entries = self.entries.read().map_err(|_| Self::unreachable_lock())?;

        let mut snapshot = Vec::new();
        let mut last_timestamp = 0;
        for id in order {
            if let Some((content, meta)) = entries.get(&id) {
                last_timestamp = last_timestamp.max(meta.timestamp);
                if boundaries.contains(meta.timestamp) {
                    snapshot.push(PersistedEntry {
                        id,
                        content: content.clone(),
                        meta: meta.clone(),
                    });
                }
            }
        }
        Ok(StoreSnapshot {
            entries: snapshot,
            last_timestamp,
        })
    }
}
