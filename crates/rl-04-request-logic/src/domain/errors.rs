use crate::domain::request::RequestState;
use shared_types::ActionName;
use thiserror::Error;

/// Why an action was rejected by the state machine.
///
/// These are expected branches of the fold, not failures: a rejected
/// action is skipped (and audited as an event where a request exists)
/// and folding continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("signer is not authorized to {action:?} in this request")]
    Unauthorized { action: ActionName },

    #[error("{action:?} is not valid from state {state:?}")]
    InvalidStateTransition {
        action: ActionName,
        state: RequestState,
    },

    #[error("a request already exists for this id")]
    DuplicateCreate,

    #[error("no request exists yet for this channel")]
    MissingRequest,

    #[error("unsupported action version {version}")]
    VersionUnsupported { version: String },

    #[error("reduction would make the expected amount negative")]
    InsufficientAmount,

    #[error("invalid amount: {raw}")]
    InvalidAmount { raw: String },

    #[error("action parameters do not match the request id")]
    RequestIdMismatch,

    #[error("malformed parameters: {reason}")]
    MalformedParameters { reason: String },
}
