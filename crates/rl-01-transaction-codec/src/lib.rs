//! # Transaction Codec (rl-01)
//!
//! The Transaction Codec turns protocol actions into signed, transmissible
//! transactions and back. It is the only layer that touches signatures.
//!
//! ## Responsibilities
//!
//! - Compute the canonical digest of an action (deep-sorted, normalized)
//! - Sign actions through a pluggable [`SignatureProvider`]
//! - Recover the signer identity of a transaction from its signature
//! - Decode persisted wire payloads back into [`SignedAction`]s
//!
//! ## Determinism Guarantee
//!
//! `sign_action` is a pure function of the canonical content: two
//! semantically equal actions built with fields in different orders
//! produce identical digests and therefore identical signatures and
//! request ids.
//!
//! ## Layout
//!
//! - `codec.rs` - digest/sign/recover/decode (pure domain logic)
//! - `ports.rs` - the `SignatureProvider` trait (driven port)
//! - `adapters.rs` - `LocalSignatureProvider` over in-process keypairs
//! - `errors.rs` - codec error taxonomy

pub mod adapters;
mod codec;
pub mod errors;
pub mod ports;

pub use adapters::LocalSignatureProvider;
pub use codec::{
    action_digest, decode_transaction, encode_transaction, recover_signer, sign_action,
    transaction_digest,
};
pub use errors::CodecError;
pub use ports::{SignatureProvider, SignatureProviderError};
