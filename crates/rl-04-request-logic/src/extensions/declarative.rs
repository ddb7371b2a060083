//! Declarative payment network.
//!
//! No on-chain detection: the parties themselves declare payments and
//! refunds. Declared amounts accumulate in the extension's values, and
//! it is up to the consumer to compare declarations from both sides.

use crate::extensions::{
    check_version, ExtensionError, ExtensionEvent, ExtensionModule, ExtensionState, ExtensionType,
    EXTENSION_VERSION,
};
use crate::domain::Request;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use shared_types::{amount, ExtensionAction, Identity, Role};
use std::collections::BTreeMap;

pub const EXTENSION_ID: &str = "pn-any-declarative";

const CREATE: &str = "create";
const DECLARE_SENT_PAYMENT: &str = "declareSentPayment";
const DECLARE_RECEIVED_PAYMENT: &str = "declareReceivedPayment";
const DECLARE_SENT_REFUND: &str = "declareSentRefund";
const DECLARE_RECEIVED_REFUND: &str = "declareReceivedRefund";
const ADD_PAYMENT_INSTRUCTION: &str = "addPaymentInstruction";
const ADD_REFUND_INSTRUCTION: &str = "addRefundInstruction";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreationParameters {
    #[serde(default)]
    payment_info: Option<serde_json::Value>,
    #[serde(default)]
    refund_info: Option<serde_json::Value>,
}

/// A free-form `note` may ride along; it reaches the audit trail through
/// the raw event parameters and is not interpreted here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclarationParameters {
    amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentInstructionParameters {
    payment_instruction: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefundInstructionParameters {
    refund_instruction: serde_json::Value,
}

/// The `pn-any-declarative` module.
pub struct DeclarativeExtension;

impl ExtensionModule for DeclarativeExtension {
    fn id(&self) -> &'static str {
        EXTENSION_ID
    }

    fn extension_type(&self) -> ExtensionType {
        ExtensionType::PaymentNetwork
    }

    fn apply_action(
        &self,
        extensions: &BTreeMap<String, ExtensionState>,
        action: &ExtensionAction,
        request: &Request,
        signer: &Identity,
        timestamp: u64,
    ) -> Result<BTreeMap<String, ExtensionState>, ExtensionError> {
        check_version(action)?;

        if action.action == CREATE {
            return self.apply_create(extensions, action, signer, timestamp);
        }

        let state = extensions
            .get(EXTENSION_ID)
            .ok_or_else(|| ExtensionError::NotCreated {
                id: EXTENSION_ID.into(),
            })?;
        let role = request.role_of(signer);

        let mut state = state.clone();
        match action.action.as_str() {
            DECLARE_SENT_PAYMENT => {
                expect_role(role, Role::Payer, action)?;
                accumulate(&mut state, "sentPaymentAmount", action)?;
            }
            DECLARE_RECEIVED_PAYMENT => {
                expect_role(role, Role::Payee, action)?;
                accumulate(&mut state, "receivedPaymentAmount", action)?;
            }
            DECLARE_SENT_REFUND => {
                // Refunds flow payee → payer.
                expect_role(role, Role::Payee, action)?;
                accumulate(&mut state, "sentRefundAmount", action)?;
            }
            DECLARE_RECEIVED_REFUND => {
                expect_role(role, Role::Payer, action)?;
                accumulate(&mut state, "receivedRefundAmount", action)?;
            }
            ADD_PAYMENT_INSTRUCTION => {
                expect_role(role, Role::Payee, action)?;
                let parameters: PaymentInstructionParameters = decode(action)?;
                set_value(&mut state, "paymentInstruction", parameters.payment_instruction);
            }
            ADD_REFUND_INSTRUCTION => {
                expect_role(role, Role::Payer, action)?;
                let parameters: RefundInstructionParameters = decode(action)?;
                set_value(&mut state, "refundInstruction", parameters.refund_instruction);
            }
            other => {
                return Err(ExtensionError::UnknownAction {
                    action: other.to_string(),
                })
            }
        }

        state.events.push(event_for(action, signer, timestamp));
        let mut extensions = extensions.clone();
        extensions.insert(EXTENSION_ID.to_string(), state);
        Ok(extensions)
    }
}

impl DeclarativeExtension {
    fn apply_create(
        &self,
        extensions: &BTreeMap<String, ExtensionState>,
        action: &ExtensionAction,
        signer: &Identity,
        timestamp: u64,
    ) -> Result<BTreeMap<String, ExtensionState>, ExtensionError> {
        if extensions.contains_key(EXTENSION_ID) {
            return Err(ExtensionError::AlreadyCreated {
                id: EXTENSION_ID.into(),
            });
        }
        let parameters: CreationParameters = decode_or_default(action)?;

        let mut values = json!({
            "sentPaymentAmount": "0",
            "receivedPaymentAmount": "0",
            "sentRefundAmount": "0",
            "receivedRefundAmount": "0",
        });
        if let Some(payment_info) = parameters.payment_info {
            values["paymentInfo"] = payment_info;
        }
        if let Some(refund_info) = parameters.refund_info {
            values["refundInfo"] = refund_info;
        }

        let state = ExtensionState {
            id: EXTENSION_ID.to_string(),
            extension_type: ExtensionType::PaymentNetwork,
            values,
            events: vec![event_for(action, signer, timestamp)],
            version: EXTENSION_VERSION.to_string(),
        };
        let mut extensions = extensions.clone();
        extensions.insert(EXTENSION_ID.to_string(), state);
        Ok(extensions)
    }
}

fn accumulate(
    state: &mut ExtensionState,
    key: &str,
    action: &ExtensionAction,
) -> Result<(), ExtensionError> {
    let parameters: DeclarationParameters = decode(action)?;
    let declared = amount::parse(&parameters.amount).map_err(|_| ExtensionError::InvalidAmount {
        raw: parameters.amount.clone(),
    })?;
    let current = state.values[key]
        .as_str()
        .and_then(|raw| amount::parse(raw).ok())
        .unwrap_or_default();
    let total = amount::add(current, declared).map_err(|_| ExtensionError::InvalidAmount {
        raw: parameters.amount,
    })?;
    set_value(state, key, json!(amount::format(total)));
    Ok(())
}

fn set_value(state: &mut ExtensionState, key: &str, value: serde_json::Value) {
    state.values[key] = value;
}

fn event_for(action: &ExtensionAction, signer: &Identity, timestamp: u64) -> ExtensionEvent {
    ExtensionEvent {
        name: action.action.clone(),
        parameters: action.parameters.clone().unwrap_or(serde_json::Value::Null),
        timestamp,
        from: signer.clone(),
    }
}

fn expect_role(role: Role, required: Role, action: &ExtensionAction) -> Result<(), ExtensionError> {
    if role == required {
        Ok(())
    } else {
        Err(ExtensionError::Unauthorized {
            action: action.action.clone(),
        })
    }
}

fn decode<P: DeserializeOwned>(action: &ExtensionAction) -> Result<P, ExtensionError> {
    let parameters = action
        .parameters
        .clone()
        .ok_or_else(|| ExtensionError::MalformedParameters {
            reason: "missing parameters".into(),
        })?;
    serde_json::from_value(parameters).map_err(|e| ExtensionError::MalformedParameters {
        reason: e.to_string(),
    })
}

fn decode_or_default<P: DeserializeOwned + Default>(
    action: &ExtensionAction,
) -> Result<P, ExtensionError> {
    match &action.parameters {
        None => Ok(P::default()),
        Some(parameters) => serde_json::from_value(parameters.clone()).map_err(|e| {
            ExtensionError::MalformedParameters {
                reason: e.to_string(),
            }
        }),
    }
}
