//! # Core Domain Entities
//!
//! Defines the protocol's shared entities.
//!
//! ## Clusters
//!
//! - **Identity & Signature**: `Identity`, `Role`, `Signature`
//! - **Actions**: `Action`, `ActionName`, `SignedAction`
//! - **Storage**: `PersistedEntry`, `EntryMetadata`, `TimestampBoundaries`

use serde::{Deserialize, Serialize};

// Re-export U256 from primitive-types for use across all layers
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
///
/// Content ids, request ids and hashed topics are all of this type.
pub type Hash = [u8; 32];

/// Render a hash as lowercase hex (wire and diagnostic form).
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a lowercase-hex hash back into its byte form.
pub fn hash_from_hex(raw: &str) -> Option<Hash> {
    let bytes = hex::decode(raw).ok()?;
    let array: [u8; 32] = bytes.try_into().ok()?;
    Some(array)
}

/// Kinds of identity the protocol understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityType {
    /// A 20-byte Ethereum-style address, `0x`-prefixed lowercase hex.
    #[serde(rename = "ethereumAddress")]
    EthereumAddress,
}

/// A protocol participant.
///
/// The `value` of an Ethereum-address identity is normalized to lowercase
/// on construction; wire data may arrive mixed-case, so role checks go
/// through [`Identity::same_as`] rather than `==`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
    pub value: String,
}

impl Identity {
    /// Build an Ethereum-address identity, normalizing the case.
    pub fn ethereum_address(value: &str) -> Self {
        Self {
            identity_type: IdentityType::EthereumAddress,
            value: value.to_ascii_lowercase(),
        }
    }

    /// Case-insensitive identity comparison.
    pub fn same_as(&self, other: &Identity) -> bool {
        self.identity_type == other.identity_type
            && self.value.eq_ignore_ascii_case(&other.value)
    }
}

/// Role of an identity relative to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "payee")]
    Payee,
    #[serde(rename = "payer")]
    Payer,
    #[serde(rename = "third-party")]
    ThirdParty,
}

/// Signature schemes supported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureMethod {
    /// Recoverable secp256k1 ECDSA over the canonical Keccak-256 digest.
    #[serde(rename = "ecdsa")]
    Ecdsa,
}

/// A signature over the canonical digest of an action.
///
/// `value` is `0x` followed by the 65-byte `r || s || v` hex encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub method: SignatureMethod,
    pub value: String,
}

/// Names of the base protocol actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionName {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "accept")]
    Accept,
    #[serde(rename = "cancel")]
    Cancel,
    #[serde(rename = "increaseExpectedAmount")]
    IncreaseExpectedAmount,
    #[serde(rename = "reduceExpectedAmount")]
    ReduceExpectedAmount,
    #[serde(rename = "addExtensionsData")]
    AddExtensionsData,
}

/// An unsigned protocol action.
///
/// `parameters` stays a raw JSON value at this level; the state machine
/// decodes it into the typed parameter struct matching `name`. `version`
/// gates compatibility: actions with an unsupported version are ignored
/// by the fold, never a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: ActionName,
    pub version: String,
    pub parameters: serde_json::Value,
}

/// The signed, transmissible unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAction {
    pub data: Action,
    pub signature: Signature,
}

/// A sub-action addressed to one extension module.
///
/// Carried in the `extensionsData` of a base action; `id` selects the
/// module, `action` is a module-specific verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAction {
    pub action: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Metadata attached to a persisted entry by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Anchoring timestamp, seconds since epoch. Assigned by the store,
    /// not by the writer.
    pub timestamp: u64,
    /// Storage-specific locator (for the in-memory adapter, the hex id).
    pub location: String,
}

/// An immutable entry read back from the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEntry {
    /// Deterministic content hash of `content`.
    pub id: Hash,
    pub content: String,
    pub meta: EntryMetadata,
}

/// Inclusive `[from, to]` timestamp boundaries for queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampBoundaries {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl TimestampBoundaries {
    pub fn contains(&self, timestamp: u64) -> bool {
        self.from.is_none_or(|from| timestamp >= from)
            && self.to.is_none_or(|to| timestamp <= to)
    }
}
