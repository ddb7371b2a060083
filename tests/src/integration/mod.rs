//! Cross-layer integration tests.

pub mod adversarial;
pub mod flows;
