//! # Adversarial Scenarios
//!
//! The log is public and append-only: anyone can write to it, including
//! parties with no role in a request. These tests inject hostile entries
//! straight through the channel log (bypassing the service's client-side
//! validation, as a real attacker would) and assert that every honest
//! fold reaches the same uncorrupted request.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rl_01_transaction_codec::{sign_action, LocalSignatureProvider};
    use rl_02_entry_retry::{ManualTimeSource, RetryTracker};
    use rl_03_channel_log::{ChannelLog, ChannelLogConfig, InMemoryContentStore};
    use rl_04_request_logic::{
        format_accept, format_cancel, format_create, format_reduce_expected_amount,
        AcceptParameters, AmountParameters, CancelParameters, CreateParameters,
        ExtensionRegistry, RequestLedgerService, RequestState, ServiceConfig,
    };
    use shared_types::{hash_to_hex, Action, Hash, Identity, U256};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    type Log = ChannelLog<InMemoryContentStore, Arc<ManualTimeSource>>;
    type Service =
        RequestLedgerService<InMemoryContentStore, Arc<ManualTimeSource>, LocalSignatureProvider>;

    struct Harness {
        service: Service,
        channel_log: Arc<Log>,
        provider: Arc<LocalSignatureProvider>,
        clock: Arc<ManualTimeSource>,
        payee: Identity,
        payer: Identity,
        stranger: Identity,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualTimeSource::new(1_000_000));
        let store = Arc::new(InMemoryContentStore::new(clock.clone()));
        let retry = Arc::new(RetryTracker::new(clock.clone()));
        let channel_log = Arc::new(ChannelLog::new(store, retry, ChannelLogConfig::default()));

        let mut provider = LocalSignatureProvider::new();
        let payee = provider.generate_identity();
        let payer = provider.generate_identity();
        let stranger = provider.generate_identity();
        let provider = Arc::new(provider);

        let service = RequestLedgerService::new(
            channel_log.clone(),
            provider.clone(),
            Arc::new(ExtensionRegistry::with_defaults()),
            ServiceConfig::default(),
        );
        Harness {
            service,
            channel_log,
            provider,
            clock,
            payee,
            payer,
            stranger,
        }
    }

    async fn create_invoice(h: &Harness, amount: &str) -> Hash {
        h.service
            .create_request(
                &CreateParameters {
                    currency: "EUR".into(),
                    expected_amount: amount.into(),
                    payee: Some(h.payee.clone()),
                    payer: Some(h.payer.clone()),
                    extensions_data: vec![],
                    timestamp: Some(1_000),
                    nonce: None,
                },
                &h.payee,
                &[],
            )
            .await
            .unwrap()
            .request_id
    }

    /// Persist a signed action directly, skipping all validation.
    async fn inject(h: &Harness, action: Action, signer: &Identity, channel: Hash) {
        let signed = sign_action(action, signer, h.provider.as_ref()).unwrap();
        h.channel_log.persist(signed, &[channel]).await.unwrap();
    }

    // =========================================================================
    // UNAUTHORIZED ACTIONS
    // =========================================================================

    #[tokio::test]
    async fn test_accept_by_payee_is_recorded_but_not_applied() {
        let h = harness();
        let request_id = create_invoice(&h, "100").await;

        h.clock.advance_millis(1_000);
        let accept = format_accept(&AcceptParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data: vec![],
        })
        .unwrap();
        inject(&h, accept, &h.payee, request_id).await;

        let request = h
            .service
            .get_request_by_id(request_id, None)
            .await
            .request
            .unwrap();
        assert_eq!(request.state, RequestState::Created);
        // The attempt stays auditable.
        assert_eq!(request.events.len(), 2);
    }

    #[tokio::test]
    async fn test_stranger_cannot_cancel() {
        let h = harness();
        let request_id = create_invoice(&h, "100").await;

        h.clock.advance_millis(1_000);
        let cancel = format_cancel(&CancelParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data: vec![],
        })
        .unwrap();
        inject(&h, cancel, &h.stranger, request_id).await;

        let request = h
            .service
            .get_request_by_id(request_id, None)
            .await
            .request
            .unwrap();
        assert_eq!(request.state, RequestState::Created);
    }

    #[tokio::test]
    async fn test_over_reduction_is_a_no_op() {
        let h = harness();
        let request_id = create_invoice(&h, "70").await;

        h.clock.advance_millis(1_000);
        let reduce = format_reduce_expected_amount(&AmountParameters {
            request_id: hash_to_hex(&request_id),
            delta_amount: "1000".into(),
            extensions_data: vec![],
        })
        .unwrap();
        inject(&h, reduce, &h.payee, request_id).await;

        let request = h
            .service
            .get_request_by_id(request_id, None)
            .await
            .request
            .unwrap();
        assert_eq!(request.expected_amount, U256::from(70u32));
        assert_eq!(request.events.len(), 2);
    }

    // =========================================================================
    // FORGED AND MALFORMED ENTRIES
    // =========================================================================

    #[tokio::test]
    async fn test_tampered_transaction_is_ignored() {
        let h = harness();
        let request_id = create_invoice(&h, "100").await;

        // Sign a legitimate reduce, then inflate the delta after signing.
        h.clock.advance_millis(1_000);
        let reduce = format_reduce_expected_amount(&AmountParameters {
            request_id: hash_to_hex(&request_id),
            delta_amount: "1".into(),
            extensions_data: vec![],
        })
        .unwrap();
        let mut signed = sign_action(reduce, &h.payee, h.provider.as_ref()).unwrap();
        signed.data.parameters["deltaAmount"] = serde_json::json!("100");
        h.channel_log.persist(signed, &[request_id]).await.unwrap();

        let outcome = h.service.get_request_by_id(request_id, None).await;
        let request = outcome.request.unwrap();
        // The recovered signer is not the payee, so nothing was reduced.
        assert_eq!(request.expected_amount, U256::from(100u32));
    }

    #[tokio::test]
    async fn test_second_create_on_a_channel_is_rejected() {
        let h = harness();
        let request_id = create_invoice(&h, "100").await;

        // A second create on an initialized channel, trying to rewrite
        // the terms.
        h.clock.advance_millis(60_000);
        let create = format_create(&CreateParameters {
            currency: "EUR".into(),
            expected_amount: "999999".into(),
            payee: Some(h.payee.clone()),
            payer: Some(h.payer.clone()),
            extensions_data: vec![],
            timestamp: Some(1_000),
            nonce: None,
        })
        .unwrap();
        inject(&h, create, &h.payee, request_id).await;

        let request = h
            .service
            .get_request_by_id(request_id, None)
            .await
            .request
            .unwrap();
        // The second create was rejected as a duplicate: amount unchanged.
        assert_eq!(request.expected_amount, U256::from(100u32));
        assert_eq!(request.events.len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_create_cannot_hijack_a_channel() {
        let h = harness();
        let request_id = create_invoice(&h, "100").await;

        // The stranger writes their own (self-consistent) create into the
        // victim's channel, timestamped earlier than the real one.
        h.clock.set_millis(500_000);
        let foreign = format_create(&CreateParameters {
            currency: "EUR".into(),
            expected_amount: "1".into(),
            payee: Some(h.stranger.clone()),
            payer: None,
            extensions_data: vec![],
            timestamp: Some(500),
            nonce: None,
        })
        .unwrap();
        inject(&h, foreign, &h.stranger, request_id).await;

        let outcome = h.service.get_request_by_id(request_id, None).await;
        let request = outcome.request.unwrap();
        // Its derived id does not match the channel, so it never folds.
        assert_eq!(request.request_id, request_id);
        assert!(request.payee.as_ref().unwrap().same_as(&h.payee));
        assert_eq!(outcome.ignored.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_action_version_is_skipped() {
        let h = harness();
        let request_id = create_invoice(&h, "100").await;

        h.clock.advance_millis(1_000);
        let mut accept = format_accept(&AcceptParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data: vec![],
        })
        .unwrap();
        accept.version = "1.0.0".into();
        inject(&h, accept, &h.payer, request_id).await;

        let request = h
            .service
            .get_request_by_id(request_id, None)
            .await
            .request
            .unwrap();
        assert_eq!(request.state, RequestState::Created);
    }

    // =========================================================================
    // ORDERING
    // =========================================================================

    #[tokio::test]
    async fn test_fold_follows_anchoring_time_not_arrival_order() {
        let h = harness();

        // Build the create locally to know the id, but persist the accept
        // first; its anchoring timestamp is later, so the fold still sees
        // create → accept.
        let create = format_create(&CreateParameters {
            currency: "EUR".into(),
            expected_amount: "100".into(),
            payee: Some(h.payee.clone()),
            payer: Some(h.payer.clone()),
            extensions_data: vec![],
            timestamp: Some(1_000),
            nonce: None,
        })
        .unwrap();
        let request_id = rl_04_request_logic::compute_request_id(&create, &h.payee).unwrap();

        h.clock.set_millis(2_000_000);
        let accept = format_accept(&AcceptParameters {
            request_id: hash_to_hex(&request_id),
            extensions_data: vec![],
        })
        .unwrap();
        inject(&h, accept, &h.payer, request_id).await;

        h.clock.set_millis(1_000_000);
        inject(&h, create, &h.payee, request_id).await;

        let request = h
            .service
            .get_request_by_id(request_id, None)
            .await
            .request
            .unwrap();
        assert_eq!(request.state, RequestState::Accepted);
        let event_timestamps: Vec<u64> =
            request.events.iter().map(|event| event.timestamp).collect();
        assert_eq!(event_timestamps, vec![1_000, 2_000]);
    }
}
