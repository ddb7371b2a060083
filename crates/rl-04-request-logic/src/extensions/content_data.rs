//! Content data: attaches arbitrary structured content (an invoice body,
//! order details) to a request at creation. Immutable afterwards.

use crate::domain::Request;
use crate::extensions::{
    check_version, ExtensionError, ExtensionEvent, ExtensionModule, ExtensionState, ExtensionType,
    EXTENSION_VERSION,
};
use serde::Deserialize;
use serde_json::json;
use shared_types::{ExtensionAction, Identity};
use std::collections::BTreeMap;

pub const EXTENSION_ID: &str = "content-data";

#[derive(Debug, Deserialize)]
struct CreationParameters {
    content: serde_json::Value,
}

pub struct ContentDataExtension;

impl ExtensionModule for ContentDataExtension {
    fn id(&self) -> &'static str {
        EXTENSION_ID
    }

    fn extension_type(&self) -> ExtensionType {
        ExtensionType::ContentData
    }

    fn apply_action(
        &self,
        extensions: &BTreeMap<String, ExtensionState>,
        action: &ExtensionAction,
        _request: &Request,
        signer: &Identity,
        timestamp: u64,
    ) -> Result<BTreeMap<String, ExtensionState>, ExtensionError> {
        check_version(action)?;

        if action.action != "create" {
            return Err(ExtensionError::UnknownAction {
                action: action.action.clone(),
            });
        }
        if extensions.contains_key(EXTENSION_ID) {
            return Err(ExtensionError::AlreadyCreated {
                id: EXTENSION_ID.into(),
            });
        }

        let parameters = action
            .parameters
            .clone()
            .ok_or_else(|| ExtensionError::MalformedParameters {
                reason: "missing parameters".into(),
            })?;
        let parameters: CreationParameters =
            serde_json::from_value(parameters).map_err(|e| ExtensionError::MalformedParameters {
                reason: e.to_string(),
            })?;
        if parameters.content.is_null() {
            return Err(ExtensionError::MalformedParameters {
                reason: "content must not be null".into(),
            });
        }

        let state = ExtensionState {
            id: EXTENSION_ID.to_string(),
            extension_type: ExtensionType::ContentData,
            values: json!({ "content": parameters.content }),
            events: vec![ExtensionEvent {
                name: "create".into(),
                parameters: action.parameters.clone().unwrap_or(serde_json::Value::Null),
                timestamp,
                from: signer.clone(),
            }],
            version: EXTENSION_VERSION.to_string(),
        };
        let mut extensions = extensions.clone();
        extensions.insert(EXTENSION_ID.to_string(), state);
        Ok(extensions)
    }
}
