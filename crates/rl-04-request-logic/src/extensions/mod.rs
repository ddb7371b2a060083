//! Pluggable extension modules.
//!
//! An extension owns one key of the request's `extensions` map and all
//! rules for mutating it. The base state machine dispatches sub-actions
//! here and isolates any failure: a rejected extension action never rolls
//! back or blocks the base transition.

mod content_data;
mod declarative;

pub use content_data::ContentDataExtension;
pub use declarative::DeclarativeExtension;

use crate::domain::Request;
use serde::{Deserialize, Serialize};
use shared_types::{ExtensionAction, Identity};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Version of the extension action format the shipped modules speak.
pub const EXTENSION_VERSION: &str = "0.1.0";

/// Broad capability class of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionType {
    #[serde(rename = "payment-network")]
    PaymentNetwork,
    #[serde(rename = "content-data")]
    ContentData,
}

/// One applied extension sub-action, for the extension's own audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionEvent {
    pub name: String,
    pub parameters: serde_json::Value,
    pub timestamp: u64,
    pub from: Identity,
}

/// The state an extension module maintains inside a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionState {
    pub id: String,
    pub extension_type: ExtensionType,
    pub values: serde_json::Value,
    pub events: Vec<ExtensionEvent>,
    pub version: String,
}

/// Why an extension rejected a sub-action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("extension {id} was already created on this request")]
    AlreadyCreated { id: String },

    #[error("extension {id} has not been created on this request")]
    NotCreated { id: String },

    #[error("unknown extension action {action}")]
    UnknownAction { action: String },

    #[error("signer may not perform {action}")]
    Unauthorized { action: String },

    #[error("unsupported extension version {version}")]
    VersionUnsupported { version: String },

    #[error("invalid amount: {raw}")]
    InvalidAmount { raw: String },

    #[error("malformed extension parameters: {reason}")]
    MalformedParameters { reason: String },
}

/// A pluggable module owning one extension id.
pub trait ExtensionModule: Send + Sync {
    fn id(&self) -> &'static str;

    fn extension_type(&self) -> ExtensionType;

    /// Apply one sub-action, returning the full new extension map.
    ///
    /// Must not mutate anything outside its own key; the request is
    /// passed read-only for role resolution.
    fn apply_action(
        &self,
        extensions: &BTreeMap<String, ExtensionState>,
        action: &ExtensionAction,
        request: &Request,
        signer: &Identity,
        timestamp: u64,
    ) -> Result<BTreeMap<String, ExtensionState>, ExtensionError>;
}

/// Module lookup by extension id.
pub struct ExtensionRegistry {
    modules: HashMap<String, Box<dyn ExtensionModule>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// A registry with the shipped modules installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DeclarativeExtension));
        registry.register(Box::new(ContentDataExtension));
        registry
    }

    pub fn register(&mut self, module: Box<dyn ExtensionModule>) {
        self.modules.insert(module.id().to_string(), module);
    }

    pub fn get(&self, id: &str) -> Option<&dyn ExtensionModule> {
        self.modules.get(id).map(|module| module.as_ref())
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared version gate for the shipped modules.
fn check_version(action: &ExtensionAction) -> Result<(), ExtensionError> {
    match action.version.as_deref() {
        None | Some(EXTENSION_VERSION) => Ok(()),
        Some(other) => Err(ExtensionError::VersionUnsupported {
            version: other.to_string(),
        }),
    }
}
