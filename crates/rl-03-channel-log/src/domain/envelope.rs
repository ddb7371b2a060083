use crate::domain::errors::ChannelLogError;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{Hash, SignedAction};

/// Version of the persisted envelope format.
pub const ENVELOPE_VERSION: &str = "0.1.0";

/// The unit actually written to the content store.
///
/// Carries the hashed topics alongside the transaction so the topic index
/// can be rebuilt from the raw store alone.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEnvelope {
    pub version: String,
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    pub topics: Vec<Hash>,
    pub transaction: SignedAction,
}

impl LogEnvelope {
    pub fn new(transaction: SignedAction, topics: Vec<Hash>) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            topics,
            transaction,
        }
    }

    /// Parse a persisted entry's content.
    ///
    /// Rejects unparsable JSON and envelopes from another format version;
    /// both leave the entry permanently ignored, never crash a sync.
    pub fn parse(content: &str) -> Result<Self, ChannelLogError> {
        let envelope: Self =
            serde_json::from_str(content).map_err(|e| ChannelLogError::Envelope {
                reason: e.to_string(),
            })?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(ChannelLogError::Envelope {
                reason: format!("unsupported envelope version {}", envelope.version),
            });
        }
        Ok(envelope)
    }

    pub fn to_json(&self) -> Result<String, ChannelLogError> {
        serde_json::to_string(self).map_err(|e| ChannelLogError::Serialization {
            reason: e.to_string(),
        })
    }
}
