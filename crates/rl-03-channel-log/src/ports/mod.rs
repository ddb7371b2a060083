//! Outbound ports.

use async_trait::async_trait;
use shared_types::{EntryMetadata, Hash, PersistedEntry, TimestampBoundaries};
use thiserror::Error;

/// Failures at the content-store boundary.
///
/// The channel log maps these onto the retry taxonomy: a mismatch is
/// permanent, everything else is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentStoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("read timed out after {0}ms")]
    Timeout(u64),

    #[error("no entry for id {0}")]
    NotFound(String),

    #[error("stored content does not hash to its id {0}")]
    ContentMismatch(String),
}

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendResult {
    pub id: Hash,
    pub meta: EntryMetadata,
}

/// Everything the store holds within a timestamp window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub entries: Vec<PersistedEntry>,
    /// The store's own notion of its most recent anchoring timestamp.
    pub last_timestamp: u64,
}

/// A content-addressed, at-least-available store with anchoring
/// timestamps. Appends are atomic: an id is either fully absent or fully
/// and immutably present.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn append(&self, content: String) -> Result<AppendResult, ContentStoreError>;

    async fn read(&self, id: &Hash) -> Result<PersistedEntry, ContentStoreError>;

    async fn read_many(&self, ids: &[Hash]) -> Result<Vec<PersistedEntry>, ContentStoreError>;

    async fn get_data(
        &self,
        boundaries: TimestampBoundaries,
    ) -> Result<StoreSnapshot, ContentStoreError>;
}
