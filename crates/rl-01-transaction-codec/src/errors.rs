//! Codec error taxonomy.
//!
//! Every variant here is a per-transaction condition: callers skip the
//! offending transaction and keep going, they never abort a whole fold
//! over one bad entry.

use thiserror::Error;

/// Errors raised while encoding, decoding, signing or verifying a
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Wire content is not a valid signed action.
    #[error("malformed transaction: {reason}")]
    MalformedTransaction { reason: String },

    /// The action could not be serialized into canonical form.
    #[error("canonicalization failed: {reason}")]
    Canonicalization { reason: String },

    /// Signature value is not `0x` + 65 bytes of hex.
    #[error("invalid signature encoding")]
    InvalidSignatureEncoding,

    /// Signature did not recover to any signer.
    #[error("invalid signature")]
    InvalidSignature,

    /// The signature provider refused or failed to sign.
    #[error(transparent)]
    Provider(#[from] crate::ports::SignatureProviderError),
}
