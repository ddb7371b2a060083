//! The transition rules: which actor may do what, from which state.

use crate::domain::errors::ActionError;
use crate::domain::parameters::{
    AcceptParameters, AddExtensionsDataParameters, AmountParameters, CancelParameters,
    CreateParameters,
};
use crate::domain::request::{Request, RequestEvent, RequestState};
use crate::extensions::ExtensionRegistry;
use serde::de::DeserializeOwned;
use shared_crypto::normalized_hash;
use shared_types::{
    amount, hash_from_hex, Action, ActionName, ExtensionAction, Hash, Identity, Role,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Version of the action format this state machine understands.
pub const PROTOCOL_VERSION: &str = "2.0.0";

/// Derive the request id from an unsigned CREATE action and its signer.
///
/// Deterministic and computable before the action is ever persisted, so
/// a creator knows the id (and the channel topic) up front.
pub fn compute_request_id(action: &Action, signer: &Identity) -> Result<Hash, ActionError> {
    let payload = serde_json::to_value(serde_json::json!({
        "data": action,
        "signer": signer,
    }))
    .map_err(|e| ActionError::MalformedParameters {
        reason: e.to_string(),
    })?;
    Ok(normalized_hash(&payload))
}

/// Apply one attributed action to the current request state.
///
/// Returns the updated request on success; on rejection the caller keeps
/// the previous state untouched. Extension sub-action failures are
/// isolated and never reject the base transition.
pub fn apply_action(
    current: &Option<Request>,
    action: &Action,
    signer: &Identity,
    timestamp: u64,
    expected_request_id: Option<Hash>,
    registry: &ExtensionRegistry,
) -> Result<Request, ActionError> {
    if action.version != PROTOCOL_VERSION {
        return Err(ActionError::VersionUnsupported {
            version: action.version.clone(),
        });
    }

    if action.name == ActionName::Create {
        return apply_create(current, action, signer, timestamp, expected_request_id, registry);
    }

    let request = current.as_ref().ok_or(ActionError::MissingRequest)?;
    let mut updated = request.clone();
    let extensions_data = match action.name {
        ActionName::Accept => {
            let parameters: AcceptParameters = decode(action)?;
            check_request_id(request, &parameters.request_id)?;
            expect_role(request, signer, Role::Payer, action.name)?;
            expect_state(request, &[RequestState::Created], action.name)?;
            updated.state = RequestState::Accepted;
            parameters.extensions_data
        }
        ActionName::Cancel => {
            let parameters: CancelParameters = decode(action)?;
            check_request_id(request, &parameters.request_id)?;
            let allowed_states: &[RequestState] = match request.role_of(signer) {
                Role::Payer => &[RequestState::Created],
                Role::Payee => &[RequestState::Created, RequestState::Accepted],
                Role::ThirdParty => {
                    return Err(ActionError::Unauthorized {
                        action: action.name,
                    })
                }
            };
            expect_state(request, allowed_states, action.name)?;
            updated.state = RequestState::Cancelled;
            parameters.extensions_data
        }
        ActionName::IncreaseExpectedAmount => {
            let parameters: AmountParameters = decode(action)?;
            check_request_id(request, &parameters.request_id)?;
            expect_role(request, signer, Role::Payer, action.name)?;
            expect_state(
                request,
                &[RequestState::Created, RequestState::Accepted],
                action.name,
            )?;
            let delta = parse_amount(&parameters.delta_amount)?;
            updated.expected_amount = amount::add(request.expected_amount, delta)
                .map_err(|_| ActionError::InvalidAmount {
                    raw: parameters.delta_amount.clone(),
                })?;
            parameters.extensions_data
        }
        ActionName::ReduceExpectedAmount => {
            let parameters: AmountParameters = decode(action)?;
            check_request_id(request, &parameters.request_id)?;
            expect_role(request, signer, Role::Payee, action.name)?;
            expect_state(
                request,
                &[RequestState::Created, RequestState::Accepted],
                action.name,
            )?;
            let delta = parse_amount(&parameters.delta_amount)?;
            updated.expected_amount = amount::sub(request.expected_amount, delta)
                .map_err(|_| ActionError::InsufficientAmount)?;
            parameters.extensions_data
        }
        ActionName::AddExtensionsData => {
            let parameters: AddExtensionsDataParameters = decode(action)?;
            check_request_id(request, &parameters.request_id)?;
            if request.role_of(signer) == Role::ThirdParty {
                return Err(ActionError::Unauthorized {
                    action: action.name,
                });
            }
            if parameters.extensions_data.is_empty() {
                return Err(ActionError::MalformedParameters {
                    reason: "extensionsData must not be empty".into(),
                });
            }
            parameters.extensions_data
        }
        ActionName::Create => unreachable!("handled above"),
    };

    apply_extensions(&mut updated, &extensions_data, signer, timestamp, registry);
    Ok(updated)
}

/// Build a [`RequestEvent`] recording an attempted action.
pub fn event_for(action: &Action, signer: &Identity, timestamp: u64) -> RequestEvent {
    RequestEvent {
        name: action.name,
        parameters: action.parameters.clone(),
        action_signer: signer.clone(),
        timestamp,
    }
}

fn apply_create(
    current: &Option<Request>,
    action: &Action,
    signer: &Identity,
    timestamp: u64,
    expected_request_id: Option<Hash>,
    registry: &ExtensionRegistry,
) -> Result<Request, ActionError> {
    if current.is_some() {
        return Err(ActionError::DuplicateCreate);
    }
    let parameters: CreateParameters = decode(action)?;

    let signer_is_payee = parameters
        .payee
        .as_ref()
        .is_some_and(|payee| payee.same_as(signer));
    let signer_is_payer = parameters
        .payer
        .as_ref()
        .is_some_and(|payer| payer.same_as(signer));
    if parameters.payee.is_none() && parameters.payer.is_none() {
        return Err(ActionError::MalformedParameters {
            reason: "at least one of payee and payer is required".into(),
        });
    }
    if !signer_is_payee && !signer_is_payer {
        return Err(ActionError::Unauthorized {
            action: ActionName::Create,
        });
    }

    let expected_amount = parse_amount(&parameters.expected_amount)?;
    let request_id = compute_request_id(action, signer)?;
    if expected_request_id.is_some_and(|expected| expected != request_id) {
        return Err(ActionError::RequestIdMismatch);
    }

    let mut request = Request {
        request_id,
        version: action.version.clone(),
        creator: signer.clone(),
        payee: parameters.payee,
        payer: parameters.payer,
        currency: parameters.currency,
        state: RequestState::Created,
        expected_amount,
        extensions: BTreeMap::new(),
        events: Vec::new(),
        timestamp: parameters.timestamp.unwrap_or(timestamp),
        nonce: parameters.nonce,
    };
    apply_extensions(
        &mut request,
        &parameters.extensions_data,
        signer,
        timestamp,
        registry,
    );
    Ok(request)
}

fn apply_extensions(
    request: &mut Request,
    extensions_data: &[ExtensionAction],
    signer: &Identity,
    timestamp: u64,
    registry: &ExtensionRegistry,
) {
    for extension_action in extensions_data {
        let Some(module) = registry.get(&extension_action.id) else {
            debug!(
                "[rl-04] no module registered for extension {}",
                extension_action.id
            );
            continue;
        };
        match module.apply_action(
            &request.extensions,
            extension_action,
            request,
            signer,
            timestamp,
        ) {
            Ok(extensions) => request.extensions = extensions,
            Err(error) => debug!(
                "[rl-04] extension {} rejected {}: {}",
                extension_action.id, extension_action.action, error
            ),
        }
    }
}

fn decode<P: DeserializeOwned>(action: &Action) -> Result<P, ActionError> {
    serde_json::from_value(action.parameters.clone()).map_err(|e| {
        ActionError::MalformedParameters {
            reason: e.to_string(),
        }
    })
}

fn parse_amount(raw: &str) -> Result<shared_types::U256, ActionError> {
    amount::parse(raw).map_err(|_| ActionError::InvalidAmount {
        raw: raw.to_string(),
    })
}

fn check_request_id(request: &Request, raw: &str) -> Result<(), ActionError> {
    match hash_from_hex(raw) {
        Some(id) if id == request.request_id => Ok(()),
        _ => Err(ActionError::RequestIdMismatch),
    }
}

fn expect_role(
    request: &Request,
    signer: &Identity,
    role: Role,
    action: ActionName,
) -> Result<(), ActionError> {
    if request.role_of(signer) == role {
        Ok(())
    } else {
        Err(ActionError::Unauthorized { action })
    }
}

fn expect_state(
    request: &Request,
    allowed: &[RequestState],
    action: ActionName,
) -> Result<(), ActionError> {
    if allowed.contains(&request.state) {
        Ok(())
    } else {
        Err(ActionError::InvalidStateTransition {
            action,
            state: request.state,
        })
    }
}
