//! # Shared Types Crate
//!
//! Cross-layer domain types for the Request-Ledger protocol stack.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type exchanged between layers
//!   (identities, signed actions, persisted entries) is defined here.
//! - **Wire Compatibility**: serde representations match the protocol's
//!   JSON encoding exactly; canonical hashing happens over these shapes.
//! - **No Layer Logic**: this crate holds data and small helpers only;
//!   validation and state transitions live in the layer crates.

pub mod amount;
pub mod entities;

pub use amount::AmountError;
pub use entities::*;
