//! # Request-Ledger Test Suite
//!
//! Unified test crate exercising the protocol stack end to end.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # Honest end-to-end request lifecycles
//!     ├── adversarial.rs  # Malicious and malformed log entries
//!     └── resilience.rs   # Storage failures, retries, boundaries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p rl-tests
//!
//! # By category
//! cargo test -p rl-tests integration::flows::
//! cargo test -p rl-tests integration::adversarial::
//! cargo test -p rl-tests integration::resilience::
//! ```

pub mod integration;
