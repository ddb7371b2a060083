//! Signing, persistence and the upward query surface.

use crate::domain::{
    apply_action, compute_request_id, format_accept, format_add_extensions_data, format_cancel,
    format_create, format_increase_expected_amount, format_reduce_expected_amount, ActionError,
    AcceptParameters, AddExtensionsDataParameters, AmountParameters, CancelParameters,
    CreateParameters, Request,
};
use crate::extensions::ExtensionRegistry;
use crate::fold::{fold_entries, FoldOutcome};
use rl_01_transaction_codec::{sign_action, CodecError, SignatureProvider};
use rl_02_entry_retry::TimeSource;
use rl_03_channel_log::{
    AppendResult, ChannelLog, ChannelLogError, ContentStore, LogEnvelope,
};
use shared_crypto::normalized_hash;
use shared_types::{
    hash_to_hex, Action, ExtensionAction, Hash, Identity, TimestampBoundaries,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Failures surfaced by the service to its caller.
///
/// Per-entry problems inside a fold never appear here; these are the
/// caller's own invalid requests and hard store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestLogicError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Channel(#[from] ChannelLogError),
}

/// Service tunables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Replay the channel and apply the action locally before persisting,
    /// so obviously invalid actions never reach the log.
    pub validate_before_persist: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            validate_before_persist: true,
        }
    }
}

/// Outcome of creating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCreation {
    pub request_id: Hash,
    pub entry: AppendResult,
}

/// The request-logic service: builds and signs actions, persists them
/// through the channel log, and folds channels back into requests.
pub struct RequestLedgerService<S, T, P>
where
    S: ContentStore + 'static,
    T: TimeSource + 'static,
    P: SignatureProvider,
{
    channel_log: Arc<ChannelLog<S, T>>,
    provider: Arc<P>,
    registry: Arc<ExtensionRegistry>,
    config: ServiceConfig,
}

impl<S, T, P> RequestLedgerService<S, T, P>
where
    S: ContentStore + 'static,
    T: TimeSource + 'static,
    P: SignatureProvider,
{
    pub fn new(
        channel_log: Arc<ChannelLog<S, T>>,
        provider: Arc<P>,
        registry: Arc<ExtensionRegistry>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            channel_log,
            provider,
            registry,
            config,
        }
    }

    /// Hash a discovery topic string (an identity value, an order
    /// reference) into its indexed form.
    pub fn hash_topic(topic: &str) -> Hash {
        normalized_hash(&serde_json::Value::String(topic.to_string()))
    }

    /// The request id these creation parameters will produce, without
    /// persisting anything.
    pub fn request_id_for(
        &self,
        parameters: &CreateParameters,
        signer: &Identity,
    ) -> Result<Hash, RequestLogicError> {
        let action = format_create(parameters)?;
        Ok(compute_request_id(&action, signer)?)
    }

    /// Create a request: validate, sign, persist under its own id plus
    /// any auxiliary discovery topics.
    pub async fn create_request(
        &self,
        parameters: &CreateParameters,
        signer: &Identity,
        auxiliary_topics: &[String],
    ) -> Result<RequestCreation, RequestLogicError> {
        let action = format_create(parameters)?;
        let request_id = compute_request_id(&action, signer)?;

        if self.config.validate_before_persist {
            apply_action(
                &None,
                &action,
                signer,
                parameters.timestamp.unwrap_or(0),
                Some(request_id),
                &self.registry,
            )?;
        }

        let mut topics = vec![request_id];
        topics.extend(auxiliary_topics.iter().map(|topic| Self::hash_topic(topic)));

        let signed = sign_action(action, signer, self.provider.as_ref())?;
        let entry = self.channel_log.persist(signed, &topics).await?;
        info!("[rl-04] created request {}", hash_to_hex(&request_id));
        Ok(RequestCreation { request_id, entry })
    }

    pub async fn accept_request(
        &self,
        request_id: Hash,
        signer: &Identity,
        extensions_data: Vec<ExtensionAction>,
    ) -> Result<AppendResult, RequestLogicError> {
        let action = format_accept(&AcceptParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data,
        })?;
        self.persist_update(request_id, action, signer).await
    }

    pub async fn cancel_request(
        &self,
        request_id: Hash,
        signer: &Identity,
        extensions_data: Vec<ExtensionAction>,
    ) -> Result<AppendResult, RequestLogicError> {
        let action = format_cancel(&CancelParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data,
        })?;
        self.persist_update(request_id, action, signer).await
    }

    pub async fn increase_expected_amount_request(
        &self,
        request_id: Hash,
        delta_amount: &str,
        signer: &Identity,
        extensions_data: Vec<ExtensionAction>,
    ) -> Result<AppendResult, RequestLogicError> {
        let action = format_increase_expected_amount(&AmountParameters {
            request_id: hash_to_hex(&request_id),
            delta_amount: delta_amount.to_string(),
            extensions_data,
        })?;
        self.persist_update(request_id, action, signer).await
    }

    pub async fn reduce_expected_amount_request(
        &self,
        request_id: Hash,
        delta_amount: &str,
        signer: &Identity,
        extensions_data: Vec<ExtensionAction>,
    ) -> Result<AppendResult, RequestLogicError> {
        let action = format_reduce_expected_amount(&AmountParameters {
            request_id: hash_to_hex(&request_id),
            delta_amount: delta_amount.to_string(),
            extensions_data,
        })?;
        self.persist_update(request_id, action, signer).await
    }

    pub async fn add_extensions_data_request(
        &self,
        request_id: Hash,
        extensions_data: Vec<ExtensionAction>,
        signer: &Identity,
    ) -> Result<AppendResult, RequestLogicError> {
        let action = format_add_extensions_data(&AddExtensionsDataParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data,
        })?;
        self.persist_update(request_id, action, signer).await
    }

    /// Fold the request's channel into its current state.
    pub async fn get_request_by_id(
        &self,
        request_id: Hash,
        boundaries: Option<TimestampBoundaries>,
    ) -> FoldOutcome {
        let entries = self
            .channel_log
            .entries_by_topic(&request_id, boundaries)
            .await;
        fold_entries(&entries, Some(request_id), &self.registry)
    }

    /// All requests discoverable under one topic string.
    ///
    /// Boundaries scope discovery: a channel counts when any entry under
    /// the topic falls inside them. The matched channels are then folded
    /// in full, so a window never truncates a request's history.
    pub async fn get_requests_by_topic(
        &self,
        topic: &str,
        boundaries: Option<TimestampBoundaries>,
    ) -> Vec<Request> {
        self.get_requests_by_multiple_topics(&[topic.to_string()], boundaries)
            .await
    }

    /// Union of requests across several topic strings, each folded once.
    pub async fn get_requests_by_multiple_topics(
        &self,
        topics: &[String],
        boundaries: Option<TimestampBoundaries>,
    ) -> Vec<Request> {
        let mut seen: HashSet<Hash> = HashSet::new();
        let mut channel_ids = Vec::new();
        for topic in topics {
            for entry in self
                .channel_log
                .entries_by_topic(&Self::hash_topic(topic), boundaries)
                .await
            {
                let Ok(envelope) = LogEnvelope::parse(&entry.content) else {
                    continue;
                };
                let Some(channel_id) = envelope.topics.first().copied() else {
                    continue;
                };
                if seen.insert(channel_id) {
                    channel_ids.push(channel_id);
                }
            }
        }

        let mut requests = Vec::new();
        for channel_id in channel_ids {
            if let Some(request) = self.get_request_by_id(channel_id, None).await.request {
                requests.push(request);
            }
        }
        requests
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    async fn persist_update(
        &self,
        request_id: Hash,
        action: Action,
        signer: &Identity,
    ) -> Result<AppendResult, RequestLogicError> {
        if self.config.validate_before_persist {
            let outcome = self.get_request_by_id(request_id, None).await;
            apply_action(
                &outcome.request,
                &action,
                signer,
                0,
                Some(request_id),
                &self.registry,
            )?;
        }
        let signed = sign_action(action, signer, self.provider.as_ref())?;
        Ok(self.channel_log.persist(signed, &[request_id]).await?)
    }
}
