//! Domain types: persisted envelope format and topic index.

mod envelope;
mod errors;
mod index;

pub use envelope::{LogEnvelope, ENVELOPE_VERSION};
pub use errors::ChannelLogError;
pub use index::TopicIndex;
