//! The request aggregate and its transition rules.

mod errors;
mod parameters;
mod request;
mod transitions;

pub use errors::ActionError;
pub use parameters::{
    format_accept, format_add_extensions_data, format_cancel, format_create,
    format_increase_expected_amount, format_reduce_expected_amount, AcceptParameters,
    AddExtensionsDataParameters, AmountParameters, CancelParameters, CreateParameters,
};
pub use request::{Request, RequestEvent, RequestState};
pub use transitions::{apply_action, compute_request_id, event_for, PROTOCOL_VERSION};
