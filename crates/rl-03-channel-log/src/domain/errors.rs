use crate::ports::ContentStoreError;
use thiserror::Error;

/// Hard failures surfaced by the channel log.
///
/// Per-entry fetch failures are absorbed into the retry tracker and never
/// appear here; these are the cases where the log itself cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelLogError {
    #[error("content store error: {0}")]
    Store(#[from] ContentStoreError),

    #[error("invalid envelope: {reason}")]
    Envelope { reason: String },

    #[error("could not serialize transaction: {reason}")]
    Serialization { reason: String },
}
