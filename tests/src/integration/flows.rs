//! # Honest End-to-End Flows
//!
//! Full-stack lifecycles over the in-memory content store: the codec
//! signs, the channel log persists and orders, the state machine folds.
//! Every status read recomputes the request from its entry log; no test
//! here ever inspects stored state directly.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rl_01_transaction_codec::LocalSignatureProvider;
    use rl_02_entry_retry::{ManualTimeSource, RetryTracker};
    use rl_03_channel_log::{ChannelLog, ChannelLogConfig, InMemoryContentStore};
    use rl_04_request_logic::{
        CreateParameters, ExtensionRegistry, RequestLedgerService, RequestState, ServiceConfig,
    };
    use shared_types::{ExtensionAction, Identity, U256};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    type Service = RequestLedgerService<
        InMemoryContentStore,
        Arc<ManualTimeSource>,
        LocalSignatureProvider,
    >;

    struct Harness {
        service: Service,
        channel_log: Arc<ChannelLog<InMemoryContentStore, Arc<ManualTimeSource>>>,
        store: Arc<InMemoryContentStore>,
        clock: Arc<ManualTimeSource>,
        payee: Identity,
        payer: Identity,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualTimeSource::new(1_000_000));
        let store = Arc::new(InMemoryContentStore::new(clock.clone()));
        let retry = Arc::new(RetryTracker::new(clock.clone()));
        let channel_log = Arc::new(ChannelLog::new(
            store.clone(),
            retry,
            ChannelLogConfig::default(),
        ));

        let mut provider = LocalSignatureProvider::new();
        let payee = provider.generate_identity();
        let payer = provider.generate_identity();

        let service = RequestLedgerService::new(
            channel_log.clone(),
            Arc::new(provider),
            Arc::new(ExtensionRegistry::with_defaults()),
            ServiceConfig::default(),
        );
        Harness {
            service,
            channel_log,
            store,
            clock,
            payee,
            payer,
        }
    }

    fn invoice(h: &Harness, amount: &str) -> CreateParameters {
        CreateParameters {
            currency: "EUR".into(),
            expected_amount: amount.into(),
            payee: Some(h.payee.clone()),
            payer: Some(h.payer.clone()),
            extensions_data: vec![],
            timestamp: Some(1_000),
            nonce: None,
        }
    }

    fn declarative(action: &str, parameters: serde_json::Value) -> ExtensionAction {
        ExtensionAction {
            action: action.into(),
            id: "pn-any-declarative".into(),
            parameters: Some(parameters),
            version: None,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_full_invoice_lifecycle() {
        let h = harness();

        let created = h
            .service
            .create_request(&invoice(&h, "100"), &h.payee, &[])
            .await
            .unwrap();

        h.clock.advance_millis(60_000);
        h.service
            .accept_request(created.request_id, &h.payer, vec![])
            .await
            .unwrap();

        h.clock.advance_millis(60_000);
        h.service
            .increase_expected_amount_request(created.request_id, "20", &h.payer, vec![])
            .await
            .unwrap();

        h.clock.advance_millis(60_000);
        h.service
            .reduce_expected_amount_request(created.request_id, "50", &h.payee, vec![])
            .await
            .unwrap();

        let outcome = h.service.get_request_by_id(created.request_id, None).await;
        let request = outcome.request.unwrap();
        assert_eq!(request.state, RequestState::Accepted);
        assert_eq!(request.expected_amount, U256::from(70u32));
        assert_eq!(request.events.len(), 4);
        assert!(outcome.ignored.is_empty());

        // The payee closes the accepted request.
        h.clock.advance_millis(60_000);
        h.service
            .cancel_request(created.request_id, &h.payee, vec![])
            .await
            .unwrap();
        let outcome = h.service.get_request_by_id(created.request_id, None).await;
        assert_eq!(outcome.request.unwrap().state, RequestState::Cancelled);
    }

    #[tokio::test]
    async fn test_fold_is_deterministic_across_reads() {
        let h = harness();
        let created = h
            .service
            .create_request(&invoice(&h, "500"), &h.payee, &[])
            .await
            .unwrap();
        h.clock.advance_millis(1_000);
        h.service
            .accept_request(created.request_id, &h.payer, vec![])
            .await
            .unwrap();

        let first = h.service.get_request_by_id(created.request_id, None).await;
        let second = h.service.get_request_by_id(created.request_id, None).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_second_node_derives_identical_request() {
        let h = harness();
        let created = h
            .service
            .create_request(&invoice(&h, "100"), &h.payee, &["customer-42".into()])
            .await
            .unwrap();
        h.clock.advance_millis(1_000);
        h.service
            .accept_request(created.request_id, &h.payer, vec![])
            .await
            .unwrap();

        // A fresh process over the same raw store: no shared index, no
        // shared signer. It must derive the exact same request.
        let retry = Arc::new(RetryTracker::new(h.clock.clone()));
        let other_log = Arc::new(ChannelLog::new(
            h.store.clone(),
            retry,
            ChannelLogConfig::default(),
        ));
        other_log.initialize().await.unwrap();
        let other_service: Service = RequestLedgerService::new(
            other_log,
            Arc::new(LocalSignatureProvider::new()),
            Arc::new(ExtensionRegistry::with_defaults()),
            ServiceConfig::default(),
        );

        let original = h.service.get_request_by_id(created.request_id, None).await;
        let derived = other_service
            .get_request_by_id(created.request_id, None)
            .await;
        assert_eq!(original, derived);

        // Discovery topics survive the rebuild too.
        let discovered = other_service.get_requests_by_topic("customer-42", None).await;
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].request_id, created.request_id);
    }

    // =========================================================================
    // EXTENSIONS
    // =========================================================================

    #[tokio::test]
    async fn test_declarative_payment_settles_an_invoice() {
        let h = harness();
        let mut parameters = invoice(&h, "100");
        parameters.extensions_data = vec![declarative(
            "create",
            serde_json::json!({"paymentInfo": {"iban": "DE89370400440532013000"}}),
        )];
        let created = h
            .service
            .create_request(&parameters, &h.payee, &[])
            .await
            .unwrap();

        h.clock.advance_millis(1_000);
        h.service
            .accept_request(created.request_id, &h.payer, vec![])
            .await
            .unwrap();

        // Payer declares sending, payee confirms receipt.
        h.clock.advance_millis(1_000);
        h.service
            .add_extensions_data_request(
                created.request_id,
                vec![declarative(
                    "declareSentPayment",
                    serde_json::json!({"amount": "100", "note": "wire 2026-08-31"}),
                )],
                &h.payer,
            )
            .await
            .unwrap();
        h.clock.advance_millis(1_000);
        h.service
            .add_extensions_data_request(
                created.request_id,
                vec![declarative(
                    "declareReceivedPayment",
                    serde_json::json!({"amount": "100"}),
                )],
                &h.payee,
            )
            .await
            .unwrap();

        let outcome = h.service.get_request_by_id(created.request_id, None).await;
        let request = outcome.request.unwrap();
        let state = &request.extensions["pn-any-declarative"];
        assert_eq!(state.values["sentPaymentAmount"], "100");
        assert_eq!(state.values["receivedPaymentAmount"], "100");
        assert_eq!(state.values["paymentInfo"]["iban"], "DE89370400440532013000");
        assert_eq!(state.events.len(), 3);
    }

    #[tokio::test]
    async fn test_content_data_rides_along() {
        let h = harness();
        let mut parameters = invoice(&h, "100");
        parameters.extensions_data = vec![ExtensionAction {
            action: "create".into(),
            id: "content-data".into(),
            parameters: Some(serde_json::json!({
                "content": {"invoiceNumber": "INV-2026-001", "items": ["consulting"]}
            })),
            version: None,
        }];
        let created = h
            .service
            .create_request(&parameters, &h.payee, &[])
            .await
            .unwrap();

        let outcome = h.service.get_request_by_id(created.request_id, None).await;
        let request = outcome.request.unwrap();
        assert_eq!(
            request.extensions["content-data"].values["content"]["invoiceNumber"],
            "INV-2026-001"
        );
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    #[tokio::test]
    async fn test_topic_discovery_spans_requests_and_updates() {
        let h = harness();
        let topic = h.payee.value.clone();

        let first = h
            .service
            .create_request(&invoice(&h, "100"), &h.payee, &[topic.clone()])
            .await
            .unwrap();
        h.clock.advance_millis(1_000);
        let mut second_parameters = invoice(&h, "200");
        second_parameters.nonce = Some(7);
        h.service
            .create_request(&second_parameters, &h.payee, &[topic.clone()])
            .await
            .unwrap();

        // An update persisted under the request id only must still be
        // visible through topic discovery.
        h.clock.advance_millis(1_000);
        h.service
            .accept_request(first.request_id, &h.payer, vec![])
            .await
            .unwrap();

        let requests = h.service.get_requests_by_topic(&topic, None).await;
        assert_eq!(requests.len(), 2);
        let accepted = requests
            .iter()
            .find(|request| request.request_id == first.request_id)
            .unwrap();
        assert_eq!(accepted.state, RequestState::Accepted);
    }

    #[tokio::test]
    async fn test_channel_log_indexes_all_persisted_topics() {
        let h = harness();
        h.service
            .create_request(
                &invoice(&h, "100"),
                &h.payee,
                &["alpha".into(), "beta".into()],
            )
            .await
            .unwrap();

        // Primary (request id) plus two auxiliary topics.
        assert_eq!(h.channel_log.indexed_topic_count(), 3);
    }
}
