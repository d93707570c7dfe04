use std::collections::BTreeMap;

use auth_session::{
    AuthClient, AuthConfig, DelegationRequest, Error, FixedDeviceId, HeadlessLauncher,
    InteractiveLogin, PasswordLogin, ReqwestExchange,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

type HttpClient = AuthClient<ReqwestExchange, FixedDeviceId, HeadlessLauncher>;

fn client_for(server: &MockServer) -> HttpClient {
    let config = AuthConfig::new("it-client", server.uri().parse().unwrap()).unwrap();
    AuthClient::new(config, FixedDeviceId::new("ci-runner"), HeadlessLauncher)
}

#[tokio::test]
async fn password_login_then_refresh_over_http() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/ro"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("scope=openid+offline_access"))
        .and(body_string_contains("device=ci-runner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-1",
            "id_token": "id-1",
            "refresh_token": "rt-1",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(query_param("access_token", "at-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "auth0|1",
            "email": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/delegation"))
        .and(body_string_contains("refresh_token=rt-1"))
        .and(body_string_contains("api_type=app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "id-2",
            "expires_in": 36000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);

    let session = client
        .login(PasswordLogin::new("db", "alice", "s3cret").with_refresh_token(true))
        .await
        .unwrap();
    assert_eq!(session.access_token, "at-1");
    assert_eq!(session.profile["email"], "alice@example.com");

    let response = client.refresh_token(None, BTreeMap::new()).await.unwrap();
    assert_eq!(response["expires_in"], 36000);

    let session = client.session().unwrap();
    assert_eq!(session.id_token, "id-2");
    assert_eq!(session.access_token, "at-1");
    assert_eq!(session.refresh_token(), Some("rt-1"));
}

#[tokio::test]
async fn rejected_credentials_surface_as_authentication_error() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/ro"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_user_password",
            "error_description": "Wrong email or password."
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client
        .login(PasswordLogin::new("db", "alice", "nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(ref m) if m.contains("Wrong email or password.")));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn server_failure_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/delegation"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client
        .delegation_token(DelegationRequest::new().with_id_token("id-0"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn headless_host_cannot_log_in_interactively() {
    let server = MockServer::start().await;
    let mut client = client_for(&server);

    let err = client
        .login_interactive(InteractiveLogin::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
