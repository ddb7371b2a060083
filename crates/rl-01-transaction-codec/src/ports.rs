//! # Ports
//!
//! Driven port for signing. Key management is an external collaborator:
//! the codec hands it a canonical digest and an identity and gets a
//! signature back, nothing more.

use shared_crypto::Hash;
use shared_types::{Identity, Signature};
use thiserror::Error;

/// Abstract interface for producing signatures.
///
/// Implementations own the key material (local keys, wallet, KMS). The
/// codec never sees private keys.
pub trait SignatureProvider: Send + Sync {
    /// Sign a canonical digest on behalf of `signer`.
    fn sign(&self, digest: &Hash, signer: &Identity) -> Result<Signature, SignatureProviderError>;
}

/// Signature provider errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureProviderError {
    /// The provider holds no key for this identity.
    #[error("no key registered for identity {identity}")]
    UnknownIdentity { identity: String },

    /// The underlying signer failed.
    #[error("signing failed: {reason}")]
    SigningFailed { reason: String },
}
