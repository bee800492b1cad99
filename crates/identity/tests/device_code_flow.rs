//! Integration tests for the interactive device-code flow against a mock
//! identity provider. The mock reports a zero poll interval so the tests do
//! not sleep.

use std::sync::{Arc, Mutex};

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use azimuth_identity::core::AuthError;
use azimuth_identity::{InteractiveBrowserCredential, TokenCredential};

const ARM_SCOPE: &str = "https://management.azure.com/.default";

async fn mount_device_code_initiation(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/organizations/oauth2/v2.0/devicecode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "device_code": "dc-123",
            "user_code": "ABCD-1234",
            "verification_uri": "https://microsoft.com/devicelogin",
            "expires_in": 900,
            "interval": 0,
            "message": "To sign in, open https://microsoft.com/devicelogin and enter ABCD-1234"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn device_code_flow_polls_until_token_issued() {
    let server = MockServer::start().await;
    mount_device_code_initiation(&server).await;

    // First poll: still pending. Mounted first and capped at one use, so the
    // follow-up poll falls through to the success mock below.
    Mock::given(method("POST"))
        .and(path("/organizations/oauth2/v2.0/token"))
        .and(body_string_contains("device_code=dc-123"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "authorization_pending",
            "error_description": "AADSTS70016: Pending end-user authorization."
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/organizations/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "interactive-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let prompted = Arc::new(Mutex::new(None::<String>));
    let prompted_clone = Arc::clone(&prompted);

    let credential = InteractiveBrowserCredential::builder()
        .with_authority_host(server.uri())
        .with_prompt(move |info| {
            *prompted_clone.lock().unwrap() = Some(info.user_code.clone());
        })
        .build()
        .unwrap();

    let token = credential.get_token(&[ARM_SCOPE]).await.unwrap();

    assert_eq!(token.authorization_value(), "Bearer interactive-token");
    assert_eq!(prompted.lock().unwrap().as_deref(), Some("ABCD-1234"));
}

#[tokio::test]
async fn cached_token_skips_second_sign_in() {
    let server = MockServer::start().await;
    mount_device_code_initiation(&server).await;

    Mock::given(method("POST"))
        .and(path("/organizations/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "interactive-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sign_ins = Arc::new(Mutex::new(0u32));
    let sign_ins_clone = Arc::clone(&sign_ins);

    let credential = InteractiveBrowserCredential::builder()
        .with_authority_host(server.uri())
        .with_prompt(move |_| *sign_ins_clone.lock().unwrap() += 1)
        .build()
        .unwrap();

    credential.get_token(&[ARM_SCOPE]).await.unwrap();
    credential.get_token(&[ARM_SCOPE]).await.unwrap();

    assert_eq!(*sign_ins.lock().unwrap(), 1);
}

#[tokio::test]
async fn declined_sign_in_is_a_terminal_error() {
    let server = MockServer::start().await;
    mount_device_code_initiation(&server).await;

    Mock::given(method("POST"))
        .and(path("/organizations/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "authorization_declined",
            "error_description": "AADSTS70020: The end user denied the authorization request."
        })))
        .mount(&server)
        .await;

    let credential = InteractiveBrowserCredential::builder()
        .with_authority_host(server.uri())
        .with_prompt(|_| {})
        .build()
        .unwrap();

    let err = credential.get_token(&[ARM_SCOPE]).await.unwrap_err();
    assert!(matches!(err, AuthError::InteractionDeclined));
}

#[tokio::test]
async fn expired_device_code_is_reported() {
    let server = MockServer::start().await;
    mount_device_code_initiation(&server).await;

    Mock::given(method("POST"))
        .and(path("/organizations/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "expired_token",
            "error_description": "AADSTS70019: Verification code expired."
        })))
        .mount(&server)
        .await;

    let credential = InteractiveBrowserCredential::builder()
        .with_authority_host(server.uri())
        .with_prompt(|_| {})
        .build()
        .unwrap();

    let err = credential.get_token(&[ARM_SCOPE]).await.unwrap_err();
    assert!(matches!(err, AuthError::DeviceCodeExpired));
}
