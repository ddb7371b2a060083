//! # Shared Crypto Crate
//!
//! Cryptographic primitives for the Request-Ledger protocol:
//!
//! - **Canonical JSON + Keccak-256** (`hashing`): deterministic
//!   serialization with deep-sorted object keys, hashed with Keccak-256.
//!   Request ids, content ids, hashed topics and signature digests are all
//!   built on this.
//! - **Recoverable ECDSA** (`ecdsa`): secp256k1 signatures carrying a
//!   recovery id, so the signer's Ethereum-style address is recovered from
//!   the signature itself rather than transmitted.

pub mod ecdsa;
pub mod errors;
pub mod hashing;

pub use ecdsa::{recover_address, EcdsaKeyPair, SIGNATURE_LENGTH};
pub use errors::CryptoError;
pub use hashing::{canonical_json, keccak256, normalized_hash, Hash};
