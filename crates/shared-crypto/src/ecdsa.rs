//! # Recoverable ECDSA (secp256k1)
//!
//! Signatures carry a recovery id so the signer's address never travels
//! with the payload: verification recovers the public key from the
//! signature and digest, then derives the Ethereum-style address from it.
//!
//! ## Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - 65-byte `r || s || v` wire encoding, `v` ∈ {27, 28}
//! - Secret key material zeroized on drop

use crate::errors::CryptoError;
use crate::hashing::{keccak256, Hash};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::Zeroize;

/// r || s || v signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// secp256k1 keypair for signing canonical digests.
pub struct EcdsaKeyPair {
    signing_key: SigningKey,
}

impl EcdsaKeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// The Ethereum-style address of this keypair, `0x`-prefixed lowercase.
    pub fn address(&self) -> String {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest, returning the 65-byte r||s||v encoding.
    pub fn sign_digest(&self, digest: &Hash) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for EcdsaKeyPair {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Recover the signer's address from a 65-byte signature and the digest
/// it signed.
///
/// Accepts `v` as 0/1 or the Ethereum convention 27/28.
pub fn recover_address(
    signature: &[u8],
    digest: &Hash,
) -> Result<String, CryptoError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignatureFormat);
    }

    let v = signature[64];
    let recovery_byte = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(CryptoError::InvalidRecoveryId(other)),
    };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(CryptoError::InvalidRecoveryId(v))?;

    let parsed = Signature::from_slice(&signature[..64])
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;

    let verifying_key = VerifyingKey::recover_from_prehash(digest, &parsed, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&verifying_key))
}

fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let uncompressed = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag; the address is the last 20 bytes of the
    // Keccak-256 of the 64-byte public key.
    let digest = keccak256(&uncompressed.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}
