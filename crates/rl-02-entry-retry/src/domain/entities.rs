use shared_types::Hash;
use thiserror::Error;

/// Why reading an entry from the content store failed.
///
/// The split between transient and permanent drives the retry policy:
/// transient failures go back on the schedule, permanent ones are
/// remembered and never fetched again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryReadError {
    /// The storage backend could not be reached.
    #[error("storage location unreachable: {0}")]
    Unreachable(String),

    /// The read did not complete in time.
    #[error("read timed out after {0}ms")]
    Timeout(u64),

    /// The content came back but its hash does not match the entry id.
    #[error("content does not match its id")]
    IncorrectContent,

    /// The content came back but cannot be parsed.
    #[error("malformed content: {0}")]
    Malformed(String),
}

impl EntryReadError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout(_))
    }
}

/// An entry id together with the failure that kept it from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntry {
    pub id: Hash,
    pub error: EntryReadError,
}

/// Tracked retry state for one failed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRecord {
    pub entry: FailedEntry,
    /// Number of failed attempts so far, starting at 1.
    pub iteration: u32,
    /// Milliseconds since epoch of the most recent attempt.
    pub last_try_timestamp: u64,
    /// False for permanent failures; they are listed but never retried.
    pub to_retry: bool,
}
