//! # Ping and Session Stats Flows
//!
//! Liveness refresh through pings and session stats, per-identity throttling
//! and the asynchronous persistence of ping records.

#[cfg(test)]
mod tests {
    use crate::integration::harness::TestApp;
    use axum::http::{header, StatusCode};
    use pd_02_proposal_registry::ProposalStore;
    use serde_json::json;
    use shared_types::{ActionClass, NodeKey};
    use std::time::Duration;

    const PING: &str = "/v1/ping_proposal";
    const STATS: &str = "/v1/node_send_stats";

    #[tokio::test]
    async fn test_ping_unknown_node() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_signed(PING, &signer, &json!({})).await;

        assert_eq!(re.status, StatusCode::BAD_REQUEST);
        assert_eq!(re.body, json!({"error": "node key not found"}));
    }

    #[tokio::test]
    async fn test_ping_requires_auth() {
        let app = TestApp::new();

        let re = app.post_raw(PING, None, "{}").await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ping_extends_liveness() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;

        app.advance(Duration::from_secs(100));
        let re = app.post_signed(PING, &signer, &json!({})).await;
        assert_eq!(re.status, StatusCode::OK);
        assert_eq!(re.body, json!({}));

        app.advance(Duration::from_secs(100));
        assert_eq!(app.listed_providers("").await.len(), 1);

        app.advance(Duration::from_secs(21));
        assert!(app.listed_providers("").await.is_empty());
    }

    #[tokio::test]
    async fn test_ping_targets_requested_service_type() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;
        app.register(&signer, "wireguard").await;

        app.advance(Duration::from_secs(100));
        app.post_signed(PING, &signer, &json!({"service_type": "wireguard"}))
            .await;
        app.advance(Duration::from_secs(30));

        assert!(app.listed_providers("").await.is_empty());
        assert_eq!(
            app.listed_providers("?service_type=wireguard").await.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_ping_throttle() {
        let app = TestApp::new();
        app.enable_throttle(ActionClass::Ping);
        let first = app.registered_signer();
        let second = app.registered_signer();
        for signer in [&first, &second] {
            app.register(signer, "openvpn").await;
        }
        app.register(&first, "wireguard").await;

        let ok = app.post_signed(PING, &first, &json!({})).await;
        assert_eq!(ok.status, StatusCode::OK);

        let throttled = app.post_signed(PING, &first, &json!({})).await;
        assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(throttled.headers.contains_key(header::RETRY_AFTER));

        let other_identity = app.post_signed(PING, &second, &json!({})).await;
        assert_eq!(other_identity.status, StatusCode::OK);

        let other_service = app
            .post_signed(PING, &first, &json!({"service_type": "wireguard"}))
            .await;
        assert_eq!(other_service.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ping_records_are_persisted() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;
        for _ in 0..3 {
            app.advance(Duration::from_secs(5));
            app.post_signed(PING, &signer, &json!({})).await;
        }
        let key = NodeKey::new(signer.address(), "openvpn");

        let store = app.drain().await;

        let records = store.availability_for(&key).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].recorded_at < pair[1].recorded_at));
    }

    #[tokio::test]
    async fn test_session_stats_unknown_node() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_signed(STATS, &signer, &json!({})).await;

        assert_eq!(re.status, StatusCode::BAD_REQUEST);
        assert_eq!(re.error(), "node key not found");
    }

    #[tokio::test]
    async fn test_session_stats_refresh_liveness() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;

        app.advance(Duration::from_secs(110));
        let re = app
            .post_signed(STATS, &signer, &json!({"bytes_sent": 1, "bytes_received": 2}))
            .await;
        assert_eq!(re.status, StatusCode::OK);
        assert_eq!(re.body, json!({}));

        app.advance(Duration::from_secs(110));
        assert_eq!(app.listed_providers("").await.len(), 1);
    }

    #[tokio::test]
    async fn test_session_stats_throttle() {
        let app = TestApp::new();
        app.enable_throttle(ActionClass::SessionStats);
        let signer = app.registered_signer();
        app.register(&signer, "openvpn").await;

        assert_eq!(
            app.post_signed(STATS, &signer, &json!({})).await.status,
            StatusCode::OK
        );
        assert_eq!(
            app.post_signed(STATS, &signer, &json!({})).await.status,
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
