//! Domain types for failed-entry tracking.

mod entities;

pub use entities::{EntryReadError, FailedEntry, RetryRecord};
