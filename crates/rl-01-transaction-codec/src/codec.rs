//! Canonical digest, signing and signer recovery.

use crate::errors::CodecError;
use crate::ports::SignatureProvider;
use shared_crypto::{normalized_hash, recover_address, Hash, SIGNATURE_LENGTH};
use shared_types::{Action, Identity, SignedAction};

/// Compute the canonical Keccak-256 digest of an action.
///
/// This is the value that gets signed, and the value request ids are
/// derived from. Field order at construction time never changes it.
pub fn action_digest(action: &Action) -> Result<Hash, CodecError> {
    let value = serde_json::to_value(action).map_err(|e| CodecError::Canonicalization {
        reason: e.to_string(),
    })?;
    Ok(normalized_hash(&value))
}

/// Canonical digest of a whole signed transaction.
///
/// Unlike [`action_digest`] this covers the signature too, so the same
/// action signed by two parties yields two distinct digests. Replay
/// detection keys on this value.
pub fn transaction_digest(signed: &SignedAction) -> Result<Hash, CodecError> {
    let value = serde_json::to_value(signed).map_err(|e| CodecError::Canonicalization {
        reason: e.to_string(),
    })?;
    Ok(normalized_hash(&value))
}

/// Sign an action into a transmissible transaction.
pub fn sign_action(
    action: Action,
    signer: &Identity,
    provider: &dyn SignatureProvider,
) -> Result<SignedAction, CodecError> {
    let digest = action_digest(&action)?;
    let signature = provider.sign(&digest, signer)?;
    Ok(SignedAction {
        data: action,
        signature,
    })
}

/// Recover the signer of a transaction from its signature.
///
/// Recomputes the canonical digest over `data` and recovers the address;
/// a tampered payload therefore recovers to a different (or no) signer.
pub fn recover_signer(signed: &SignedAction) -> Result<Identity, CodecError> {
    let digest = action_digest(&signed.data)?;

    let raw = signed
        .signature
        .value
        .strip_prefix("0x")
        .ok_or(CodecError::InvalidSignatureEncoding)?;
    let bytes = hex::decode(raw).map_err(|_| CodecError::InvalidSignatureEncoding)?;
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(CodecError::InvalidSignatureEncoding);
    }

    let address =
        recover_address(&bytes, &digest).map_err(|_| CodecError::InvalidSignature)?;
    Ok(Identity::ethereum_address(&address))
}

/// Serialize a transaction for persistence.
pub fn encode_transaction(signed: &SignedAction) -> Result<String, CodecError> {
    serde_json::to_string(signed).map_err(|e| CodecError::MalformedTransaction {
        reason: e.to_string(),
    })
}

/// Parse persisted wire content back into a transaction.
pub fn decode_transaction(content: &str) -> Result<SignedAction, CodecError> {
    serde_json::from_str(content).map_err(|e| CodecError::MalformedTransaction {
        reason: e.to_string(),
    })
}
