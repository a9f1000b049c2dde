//! # Authorization Header Flows
//!
//! Every signed endpoint shares one decoder. These scenarios run it through
//! `register_proposal` with an otherwise valid payload, so the only thing
//! that can fail is authentication.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{registration, TestApp};
    use axum::http::StatusCode;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use pd_01_signature_auth::test_helpers::StaticSigner;
    use serde_json::json;

    const PATH: &str = "/v1/register_proposal";

    fn body(signer: &StaticSigner) -> Vec<u8> {
        serde_json::to_vec(&registration(signer, "openvpn", json!([]))).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_raw(PATH, None, body(&signer)).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert_eq!(re.error(), "missing Authorization in request header");
    }

    #[tokio::test]
    async fn test_header_without_value() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_raw(PATH, Some("Signature"), body(&signer)).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            re.error(),
            "invalid Authorization header value provided, correct format: Signature <signature_base64_encoded>"
        );
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_raw(PATH, Some("incorrectType sig"), body(&signer)).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert_eq!(re.error(), "authentication type have to be Signature");
    }

    #[tokio::test]
    async fn test_empty_signature() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_raw(PATH, Some("Signature "), body(&signer)).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert_eq!(re.error(), "signature was not provided");
    }

    #[tokio::test]
    async fn test_signature_not_base64() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.post_raw(PATH, Some("Signature not_base_64"), body(&signer)).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert!(
            re.error().starts_with("signature must be base64 encoded: "),
            "{}",
            re.error()
        );
    }

    #[tokio::test]
    async fn test_signature_of_wrong_length() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let payload = body(&signer);
        let mut signature = signer.sign(&payload).to_vec();
        signature.pop();

        let header = format!("Signature {}", STANDARD.encode(&signature));
        let re = app.post_raw(PATH, Some(&header), payload).await;

        assert_eq!(re.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            re.error(),
            "invalid signature format: Unexpected signature format.  Must be length 65 byte string"
        );
    }

    #[tokio::test]
    async fn test_valid_signature_registers() {
        let app = TestApp::new();
        let signer = app.registered_signer();

        let re = app.register(&signer, "openvpn").await;

        assert_eq!(re.status, StatusCode::OK, "{:?}", re.body);
        assert_eq!(re.body, json!({}));
    }

    #[tokio::test]
    async fn test_signature_over_other_body_recovers_other_identity() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let payload = body(&signer);
        let header = signer.authorization_header(b"{\"something\":\"else\"}");

        let re = app.post_raw(PATH, Some(&header), payload).await;

        assert_eq!(re.status, StatusCode::FORBIDDEN);
        assert_eq!(re.error(), "provider_id does not match current identity");
    }

    #[tokio::test]
    async fn test_provider_id_case_is_ignored() {
        let app = TestApp::new();
        let signer = app.registered_signer();
        let mut payload = registration(&signer, "openvpn", json!([]));
        let upper = signer.address().to_canonical()[2..].to_uppercase();
        payload["service_proposal"]["provider_id"] = json!(format!("0x{upper}"));

        let re = app.post_signed(PATH, &signer, &payload).await;

        assert_eq!(re.status, StatusCode::OK, "{:?}", re.body);
    }
}
