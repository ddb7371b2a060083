//! # Request Logic (rl-04)
//!
//! The request state machine. A request's current state is never stored;
//! it is recomputed on every read by folding the channel's ordered action
//! log. The fold is a pure, total function of the sorted entry sequence:
//! malformed, unauthorized or duplicate entries are skipped (and audited
//! as events where attributable), never allowed to corrupt honest state.
//!
//! Payment-network-specific state lives in pluggable extension modules,
//! dispatched per sub-action and isolated from the base transition.
//!
//! ## Architecture
//!
//! - `domain`: the request aggregate, typed action parameters, transitions
//! - `extensions`: the module trait, registry and shipped modules
//! - `fold`: the log-replay reduction
//! - `service`: signing, persistence and the upward query surface

pub mod domain;
pub mod extensions;
pub mod fold;
pub mod service;

pub use domain::{
    compute_request_id, format_accept, format_add_extensions_data, format_cancel, format_create,
    format_increase_expected_amount, format_reduce_expected_amount, ActionError,
    AcceptParameters, AddExtensionsDataParameters, AmountParameters, CancelParameters,
    CreateParameters, Request, RequestEvent, RequestState, PROTOCOL_VERSION,
};
pub use extensions::{
    ContentDataExtension, DeclarativeExtension, ExtensionError, ExtensionEvent, ExtensionModule,
    ExtensionRegistry, ExtensionState, ExtensionType,
};
pub use fold::{fold_entries, FoldOutcome, IgnoredEntry};
pub use service::{RequestCreation, RequestLedgerService, RequestLogicError, ServiceConfig};
