use crate::extensions::ExtensionState;
use serde::{Deserialize, Serialize};
use shared_types::{ActionName, Hash, Identity, Role, U256};
use std::collections::BTreeMap;

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "cancelled")]
    Cancelled,
}

/// One attempted action, applied or not.
///
/// The event log is the audit trail for disputes: rejected actions are
/// recorded here even though they changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEvent {
    pub name: ActionName,
    pub parameters: serde_json::Value,
    pub action_signer: Identity,
    pub timestamp: u64,
}

/// The derived request aggregate.
///
/// Never stored: the output of folding a channel's entries. `extensions`
/// is owned per-key by the matching extension module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_id: Hash,
    pub version: String,
    pub creator: Identity,
    pub payee: Option<Identity>,
    pub payer: Option<Identity>,
    pub currency: String,
    pub state: RequestState,
    pub expected_amount: U256,
    pub extensions: BTreeMap<String, ExtensionState>,
    pub events: Vec<RequestEvent>,
    pub timestamp: u64,
    pub nonce: Option<u64>,
}

impl Request {
    /// The signer's role relative to this request.
    pub fn role_of(&self, identity: &Identity) -> Role {
        if self.payee.as_ref().is_some_and(|payee| payee.same_as(identity)) {
            Role::Payee
        } else if self.payer.as_ref().is_some_and(|payer| payer.same_as(identity)) {
            Role::Payer
        } else {
            Role::ThirdParty
        }
    }
}
