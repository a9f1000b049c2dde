//! # Listing Flows
//!
//! Consumer queries against `GET /v1/proposals`: liveness window and every
//! filter the endpoint accepts.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{registration_with_definition, TestApp};
    use axum::http::StatusCode;
    use pd_02_proposal_registry::ProposalRegistryApi;
    use serde_json::json;
    use shared_types::ProviderId;
    use std::time::Duration;

    const TRUST_LIST: &str = "https://trust.example/list";

    #[tokio::test]
    async fn test_empty_listing() {
        let app = TestApp::new();

        let re = app.get("/v1/proposals").await;

        assert_eq!(re.status, StatusCode::OK);
        assert_eq!(re.body, json!({"proposals": []}));
    }

    #[tokio::test]
    async fn test_listing_returns_submitted_document() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;

        let re = app.get("/v1/proposals").await;

        let proposal = &re.body["proposals"][0];
        assert_eq!(proposal["format"], "service-proposal/v1");
        assert_eq!(proposal["service_type"], "openvpn");
        assert_eq!(proposal["id"], 1);
    }

    #[tokio::test]
    async fn test_liveness_window() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;

        app.advance(Duration::from_secs(120));
        assert_eq!(app.listed_providers("").await.len(), 1);

        app.advance(Duration::from_secs(1));
        assert!(app.listed_providers("").await.is_empty());
    }

    #[tokio::test]
    async fn test_service_type_filter() {
        let app = TestApp::new();
        let vpn = app.registered_signer();
        let wg = app.registered_signer();
        app.register(&vpn, "openvpn").await;
        app.register(&wg, "wireguard").await;
        let vpn_id = vpn.address().to_canonical();
        let wg_id = wg.address().to_canonical();

        assert_eq!(app.listed_providers("").await, vec![vpn_id.clone()]);
        assert_eq!(
            app.listed_providers("?service_type=wireguard").await,
            vec![wg_id.clone()]
        );
        assert!(app.listed_providers("?service_type=noop").await.is_empty());

        let mut all = app.listed_providers("?service_type=all").await;
        all.sort();
        let mut expected = vec![vpn_id, wg_id];
        expected.sort();
        assert_eq!(all, expected);
    }

    #[tokio::test]
    async fn test_node_key_filter() {
        let app = TestApp::new();
        let first = app.registered_signer();
        let second = app.registered_signer();
        app.register(&first, "openvpn").await;
        app.register(&second, "openvpn").await;
        let first_id = first.address().to_canonical();

        assert_eq!(
            app.listed_providers(&format!("?node_key={first_id}")).await,
            vec![first_id.clone()]
        );
        assert_eq!(
            app.listed_providers(&format!("?node_key={}", first_id.to_uppercase().replace("0X", "0x")))
                .await,
            vec![first_id]
        );
        assert!(app.listed_providers("?node_key=0xunknown").await.is_empty());
    }

    #[tokio::test]
    async fn test_node_type_filter() {
        let app = TestApp::new();
        let residential = app.registered_signer();
        let datacenter = app.registered_signer();
        app.post_signed(
            "/v1/register_proposal",
            &residential,
            &registration_with_definition(
                &residential,
                "openvpn",
                json!([]),
                json!({"location": {"node_type": "residential"}}),
            ),
        )
        .await;
        app.register(&datacenter, "openvpn").await;

        assert_eq!(
            app.listed_providers("?node_type=residential").await,
            vec![residential.address().to_canonical()]
        );
        assert_eq!(
            app.listed_providers("?node_type=data-center").await,
            vec![datacenter.address().to_canonical()]
        );
        assert!(app.listed_providers("?node_type=cellular").await.is_empty());
    }

    #[tokio::test]
    async fn test_access_policy_filters() {
        let app = TestApp::new();
        let public = app.registered_signer();
        let restricted = app.registered_signer();
        app.register(&public, "openvpn").await;
        app.register_with_policies(
            &restricted,
            "openvpn",
            json!([{"id": "mysterium", "source": TRUST_LIST}]),
        )
        .await;
        let public_id = public.address().to_canonical();
        let restricted_id = restricted.address().to_canonical();

        assert_eq!(app.listed_providers("").await, vec![public_id.clone()]);
        assert_eq!(
            app.listed_providers("?access_policy%5Bid%5D=mysterium").await,
            vec![restricted_id.clone()]
        );
        assert_eq!(
            app.listed_providers(&format!(
                "?access_policy%5Bid%5D=mysterium&access_policy%5Bsource%5D={TRUST_LIST}"
            ))
            .await,
            vec![restricted_id.clone()]
        );
        assert!(app
            .listed_providers("?access_policy%5Bid%5D=mysterium&access_policy%5Bsource%5D=elsewhere")
            .await
            .is_empty());
        assert!(app
            .listed_providers("?access_policy%5Bid%5D=unknown")
            .await
            .is_empty());

        let mut any = app.listed_providers("?access_policy=*").await;
        any.sort();
        let mut expected = vec![public_id, restricted_id];
        expected.sort();
        assert_eq!(any, expected);
    }

    #[tokio::test]
    async fn test_bounty_only_filter() {
        let app = TestApp::new();
        let eligible = app.registered_signer();
        let other = app.registered_signer();
        app.register(&eligible, "openvpn").await;
        app.register(&other, "openvpn").await;
        app.registry
            .record_identity_registration(&ProviderId::from(eligible.address()), "0xpayout")
            .unwrap();

        for truthy in ["true", "1", "yes"] {
            assert_eq!(
                app.listed_providers(&format!("?bounty_only={truthy}")).await,
                vec![eligible.address().to_canonical()],
                "{truthy}"
            );
        }
        assert_eq!(app.listed_providers("?bounty_only=false").await.len(), 2);
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "wireguard").await;
        let provider = signer.address().to_canonical();

        assert_eq!(
            app.listed_providers(&format!(
                "?service_type=wireguard&node_key={provider}&node_type=data-center"
            ))
            .await,
            vec![provider.clone()]
        );
        assert!(app
            .listed_providers(&format!("?service_type=openvpn&node_key={provider}"))
            .await
            .is_empty());
    }
}
