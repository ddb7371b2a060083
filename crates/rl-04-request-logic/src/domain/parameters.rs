//! Typed action parameters and the builders that wrap them in actions.

use crate::domain::errors::ActionError;
use crate::domain::transitions::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};
use shared_types::{Action, ActionName, ExtensionAction, Identity};

/// Parameters of a CREATE action.
///
/// `expected_amount` travels as a decimal string; at least one of `payee`
/// and `payer` must be set, and the signer must be one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParameters {
    pub currency: String,
    pub expected_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Identity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_data: Vec<ExtensionAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Distinguishes otherwise-identical requests from the same creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptParameters {
    /// Lowercase-hex request id this action addresses.
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_data: Vec<ExtensionAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelParameters {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_data: Vec<ExtensionAction>,
}

/// Parameters of INCREASE_EXPECTED_AMOUNT and REDUCE_EXPECTED_AMOUNT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountParameters {
    pub request_id: String,
    pub delta_amount: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_data: Vec<ExtensionAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExtensionsDataParameters {
    pub request_id: String,
    pub extensions_data: Vec<ExtensionAction>,
}

fn wrap<P: Serialize>(name: ActionName, parameters: &P) -> Result<Action, ActionError> {
    let parameters =
        serde_json::to_value(parameters).map_err(|e| ActionError::MalformedParameters {
            reason: e.to_string(),
        })?;
    Ok(Action {
        name,
        version: PROTOCOL_VERSION.to_string(),
        parameters,
    })
}

pub fn format_create(parameters: &CreateParameters) -> Result<Action, ActionError> {
    wrap(ActionName::Create, parameters)
}

pub fn format_accept(parameters: &AcceptParameters) -> Result<Action, ActionError> {
    wrap(ActionName::Accept, parameters)
}

pub fn format_cancel(parameters: &CancelParameters) -> Result<Action, ActionError> {
    wrap(ActionName::Cancel, parameters)
}

pub fn format_increase_expected_amount(
    parameters: &AmountParameters,
) -> Result<Action, ActionError> {
    wrap(ActionName::IncreaseExpectedAmount, parameters)
}

pub fn format_reduce_expected_amount(
    parameters: &AmountParameters,
) -> Result<Action, ActionError> {
    wrap(ActionName::ReduceExpectedAmount, parameters)
}

pub fn format_add_extensions_data(
    parameters: &AddExtensionsDataParameters,
) -> Result<Action, ActionError> {
    wrap(ActionName::AddExtensionsData, parameters)
}
