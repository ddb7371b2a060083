//! # Channel Log (rl-03)
//!
//! Persists signed transactions to a content-addressed store under one or
//! more topics, and serves them back as a channel: the timestamp-ordered
//! set of entries sharing a topic. Individual fetch failures go to the
//! retry tracker and never abort a query.
//!
//! ## Architecture
//!
//! - `domain`: the persisted envelope format and the topic index
//! - `ports`: the async `ContentStore` abstraction
//! - `adapters`: a reference in-memory store
//! - `service`: the `ChannelLog` itself

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryContentStore;
pub use domain::{ChannelLogError, LogEnvelope, TopicIndex, ENVELOPE_VERSION};
pub use ports::{AppendResult, ContentStore, ContentStoreError, StoreSnapshot};
pub use service::{ChannelLog, ChannelLogConfig, SyncReport};
