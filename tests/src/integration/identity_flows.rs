//! # Identity Creation Flows
//!
//! `POST /v1/identities` carries no payload; the signature is over the
//! empty body.

#[cfg(test)]
mod tests {
    use crate::integration::harness::TestApp;
    use axum::http::StatusCode;
    use pd_01_signature_auth::test_helpers::StaticSigner;
    use serde_json::json;

    #[tokio::test]
    async fn test_identity_created() {
        let app = TestApp::new();
        let signer = StaticSigner::new();
        let header = signer.authorization_header(b"");

        let re = app.post_raw("/v1/identities", Some(&header), Vec::new()).await;

        assert_eq!(re.status, StatusCode::OK);
        assert_eq!(re.body, json!({}));
        assert!(app.store().identity_exists(&signer.address()).unwrap());
    }

    #[tokio::test]
    async fn test_identity_already_exists() {
        let app = TestApp::new();
        let signer = StaticSigner::new();
        let header = signer.authorization_header(b"");

        let first = app.post_raw("/v1/identities", Some(&header), Vec::new()).await;
        let second = app.post_raw("/v1/identities", Some(&header), Vec::new()).await;

        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(second.status, StatusCode::FORBIDDEN);
        assert_eq!(second.body, json!({"error": "identity already exists"}));
    }

    #[tokio::test]
    async fn test_identity_requires_signature() {
        let app = TestApp::new();

        let re = app.post_raw("/v1/identities", None, Vec::new()).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert_eq!(re.error(), "missing Authorization in request header");
    }
}
