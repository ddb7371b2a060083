//! # Entry Retry (rl-02)
//!
//! Bookkeeping for content-store entries that failed to load. Transient
//! failures (network, timeouts) are retried on a quadratic backoff
//! schedule; permanent failures (bad content) are remembered so they are
//! never fetched again, but stay listed for diagnostics.
//!
//! ## Architecture
//!
//! - `domain`: failure taxonomy and retry records
//! - `ports`: the `TimeSource` clock abstraction
//! - `adapters`: system and manually-driven clocks
//! - `service`: the `RetryTracker`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{ManualTimeSource, SystemTimeSource};
pub use domain::{EntryReadError, FailedEntry, RetryRecord};
pub use ports::TimeSource;
pub use service::{RetryTracker, BASE_RETRY_INTERVAL_MS};
