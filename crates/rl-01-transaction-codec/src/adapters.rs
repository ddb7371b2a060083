//! In-process signature provider backed by locally held keys.

use crate::ports::{SignatureProvider, SignatureProviderError};
use shared_crypto::{EcdsaKeyPair, Hash};
use shared_types::{Identity, Signature, SignatureMethod};
use std::collections::HashMap;

/// Signs with keypairs held in memory, keyed by their derived address.
///
/// Meant for wallets, tests and tooling that keep keys locally. Remote
/// signers (hardware, custody services) plug in through the same
/// [`SignatureProvider`] port.
#[derive(Default)]
pub struct LocalSignatureProvider {
    keys: HashMap<String, EcdsaKeyPair>,
}

impl LocalSignatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a keypair, returning the identity it signs for.
    pub fn register(&mut self, keypair: EcdsaKeyPair) -> Identity {
        let identity = Identity::ethereum_address(&keypair.address());
        self.keys.insert(identity.value.clone(), keypair);
        identity
    }

    /// Generate and register a fresh keypair.
    pub fn generate_identity(&mut self) -> Identity {
        self.register(EcdsaKeyPair::generate())
    }
}

impl SignatureProvider for LocalSignatureProvider {
    fn sign(&self, digest: &Hash, signer: &Identity) -> Result<Signature, SignatureProviderError> {
        let keypair = self.keys.get(&signer.value.to_ascii_lowercase()).ok_or(
            SignatureProviderError::UnknownIdentity {
                identity: signer.value.clone(),
            },
        )?;

        let bytes = keypair
            .sign_digest(digest)
            .map_err(|e| SignatureProviderError::SigningFailed {
                reason: e.to_string(),
            })?;

        Ok(Signature {
            method: SignatureMethod::Ecdsa,
            value: format!("0x{}", hex::encode(bytes)),
        })
    }
}
