//! # Registration Flows
//!
//! Register and unregister through HTTP, checking both the response and
//! what the store holds afterwards.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{registration, TestApp, REMOTE_ADDR};
    use axum::http::{header, StatusCode};
    use pd_02_proposal_registry::ProposalStore;
    use pd_04_api_gateway::GatewayConfig;
    use serde_json::json;
    use shared_types::{ActionClass, NodeKey, ProviderId};

    const REGISTER: &str = "/v1/register_proposal";
    const UNREGISTER: &str = "/v1/unregister_proposal";

    #[tokio::test]
    async fn test_register_then_listed() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.register(&signer, "openvpn").await;
        assert_eq!(re.status, StatusCode::OK);
        assert_eq!(re.body, json!({}));

        let providers = app.listed_providers("").await;
        assert_eq!(providers, vec![signer.address().to_canonical()]);
    }

    #[tokio::test]
    async fn test_register_records_observed_ip_and_node_type() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let mut body = registration(&signer, "openvpn", json!([]));
        body["service_proposal"]["service_definition"] =
            json!({"location": {"country": "NL", "node_type": "residential"}});
        body["service_proposal"]["ip"] = json!("6.6.6.6");

        let re = app.post_signed(REGISTER, &signer, &body).await;
        assert_eq!(re.status, StatusCode::OK);

        let node = app
            .store()
            .get_node(&NodeKey::new(signer.address(), "openvpn"))
            .unwrap()
            .unwrap();
        assert_eq!(node.ip.as_deref(), Some(REMOTE_ADDR));
        assert_eq!(node.node_type, "residential");
    }

    #[tokio::test]
    async fn test_malformed_service_definition_falls_back() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let mut body = registration(&signer, "openvpn", json!([]));
        body["service_proposal"]["service_definition"] = json!("not an object");

        let re = app.post_signed(REGISTER, &signer, &body).await;
        assert_eq!(re.status, StatusCode::OK);

        let node = app
            .store()
            .get_node(&NodeKey::new(signer.address(), "openvpn"))
            .unwrap()
            .unwrap();
        assert_eq!(node.node_type, "data-center");
    }

    #[tokio::test]
    async fn test_provider_id_mismatch() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let mut body = registration(&signer, "openvpn", json!([]));
        body["service_proposal"]["provider_id"] = json!("incorrect");

        let re = app.post_signed(REGISTER, &signer, &body).await;

        assert_eq!(re.status, StatusCode::FORBIDDEN);
        assert_eq!(
            re.body,
            json!({"error": "provider_id does not match current identity"})
        );
        assert!(app.store().list_nodes().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_rejected_before_auth() {
        let app = TestApp::new();

        for raw in ["{asd}", "\"some string\"", "[]"] {
            let re = app.post_raw(REGISTER, None, raw).await;
            assert_eq!(re.status, StatusCode::BAD_REQUEST, "{raw}");
            assert_eq!(re.body, json!({"error": "payload must be a valid json"}));
        }
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_signed(REGISTER, &signer, &json!({})).await;
        assert_eq!(re.status, StatusCode::BAD_REQUEST);
        assert_eq!(re.error(), "missing service_proposal");

        let mut no_provider = registration(&signer, "openvpn", json!([]));
        no_provider["service_proposal"]
            .as_object_mut()
            .unwrap()
            .remove("provider_id");
        let re = app.post_signed(REGISTER, &signer, &no_provider).await;
        assert_eq!(re.status, StatusCode::BAD_REQUEST);
        assert_eq!(re.error(), "missing provider_id");

        let mut no_service_type = registration(&signer, "openvpn", json!([]));
        no_service_type["service_proposal"]
            .as_object_mut()
            .unwrap()
            .remove("service_type");
        let re = app.post_signed(REGISTER, &signer, &no_service_type).await;
        assert_eq!(re.status, StatusCode::BAD_REQUEST);
        assert_eq!(re.error(), "missing service_type");
    }

    #[tokio::test]
    async fn test_unregistered_identity_refused_when_verifying() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.oracle.revoke(&signer.address());

        let re = app.register(&signer, "openvpn").await;

        assert_eq!(re.status, StatusCode::FORBIDDEN);
        assert_eq!(re.body, json!({"error": "identity is not registered"}));
    }

    #[tokio::test]
    async fn test_unregistered_identity_accepted_without_verification() {
        let mut config = GatewayConfig::default();
        config.verification.verify_identity = false;
        let app = TestApp::with_config(config);
        let signer = pd_01_signature_auth::test_helpers::StaticSigner::random();

        let re = app.register(&signer, "openvpn").await;

        assert_eq!(re.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verification_toggle_applies_at_runtime() {
        let app = TestApp::new();
        let signer = pd_01_signature_auth::test_helpers::StaticSigner::random();

        assert_eq!(app.register(&signer, "openvpn").await.status, StatusCode::FORBIDDEN);
        app.flags.set_verify_identity(false);
        assert_eq!(app.register(&signer, "openvpn").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reregister_replaces_access_policies() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let provider = ProviderId::from(signer.address());

        app.register_with_policies(
            &signer,
            "openvpn",
            json!([
                {"id": "mysterium", "source": "https://trust.example/list"},
                {"id": "partner", "source": "https://partner.example/list"}
            ]),
        )
        .await;
        app.register_with_policies(
            &signer,
            "openvpn",
            json!([{"id": "partner", "source": "https://partner.example/list"}]),
        )
        .await;

        let policies = app.store().access_policies(&provider).unwrap();
        let ids: Vec<&str> = policies.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["partner"]);
    }

    #[tokio::test]
    async fn test_policies_belong_to_provider_not_service_type() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let provider = ProviderId::from(signer.address());

        let re = app
            .register_with_policies(
                &signer,
                "openvpn",
                json!([{"id": "mysterium", "source": "https://trust.example/list"}]),
            )
            .await;
        assert_eq!(re.status, StatusCode::OK);
        assert!(app.listed_providers("").await.is_empty());

        let re = app.register(&signer, "wireguard").await;
        assert_eq!(re.status, StatusCode::OK);

        assert!(app.store().access_policies(&provider).unwrap().is_empty());
        assert_eq!(
            app.listed_providers("").await,
            vec![signer.address().to_canonical()]
        );
    }

    #[tokio::test]
    async fn test_two_service_types_unregister_independently() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let provider = signer.address().to_canonical();
        app.register(&signer, "openvpn").await;
        app.register(&signer, "wireguard").await;

        let re = app
            .post_signed(
                UNREGISTER,
                &signer,
                &json!({"provider_id": provider, "service_type": "openvpn"}),
            )
            .await;
        assert_eq!(re.status, StatusCode::OK);
        assert_eq!(re.body, json!({}));

        assert!(app.listed_providers("?service_type=openvpn").await.is_empty());
        assert_eq!(
            app.listed_providers("?service_type=wireguard").await,
            vec![provider.clone()]
        );
        assert_eq!(app.store().list_nodes().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unregister_without_service_type_clears_all() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let provider = signer.address().to_canonical();
        app.register(&signer, "openvpn").await;
        app.register(&signer, "wireguard").await;

        let re = app
            .post_signed(UNREGISTER, &signer, &json!({"provider_id": provider}))
            .await;
        assert_eq!(re.status, StatusCode::OK);

        assert!(app.listed_providers("?service_type=all").await.is_empty());
    }

    #[tokio::test]
    async fn test_register_after_unregister_restores_listing() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let provider = signer.address().to_canonical();

        for _ in 0..2 {
            app.register(&signer, "openvpn").await;
            assert_eq!(app.listed_providers("").await, vec![provider.clone()]);
            app.post_signed(UNREGISTER, &signer, &json!({"provider_id": provider}))
                .await;
            assert!(app.listed_providers("").await.is_empty());
        }
        assert_eq!(app.store().list_nodes().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unregister_validation() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_signed(UNREGISTER, &signer, &json!({})).await;
        assert_eq!(re.status, StatusCode::BAD_REQUEST);
        assert_eq!(re.error(), "missing provider_id");

        let re = app
            .post_signed(UNREGISTER, &signer, &json!({"provider_id": "someone else"}))
            .await;
        assert_eq!(re.status, StatusCode::FORBIDDEN);
        assert_eq!(re.error(), "provider_id does not match current identity");
    }

    #[tokio::test]
    async fn test_register_throttle_is_per_service_type() {
        let app = TestApp::new();
        app.enable_throttle(ActionClass::Register);
        let signer = app.registered_signer();

        assert_eq!(app.register(&signer, "openvpn").await.status, StatusCode::OK);

        let throttled = app.register(&signer, "openvpn").await;
        assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(throttled.error(), "too many requests");
        assert!(throttled.headers.contains_key(header::RETRY_AFTER));

        assert_eq!(app.register(&signer, "wireguard").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_throttle_reset_isolates_scenarios() {
        let app = TestApp::new();
        app.enable_throttle(ActionClass::Register);
        let signer = app.registered_signer();

        app.register(&signer, "openvpn").await;
        app.gateway.throttle().clear();

        assert_eq!(app.register(&signer, "openvpn").await.status, StatusCode::OK);
    }
}
