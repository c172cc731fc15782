#![allow(dead_code)]

use std::time::Duration;

use hyperproof::{ApiClient, ClientConfig, Credentials};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth/token";

pub fn credentials() -> Credentials {
    Credentials::new("client-id", "client-secret")
}

/// Points both the token endpoint and the API base at `server`.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_token_endpoint(format!("{}{TOKEN_PATH}", server.uri()))
        .with_api_base(format!("{}/v1", server.uri()))
        .with_timeout(Duration::from_secs(5))
}

/// A client that has not authenticated yet.
pub fn lazy_client(server: &MockServer) -> ApiClient {
    ApiClient::new(credentials(), config_for(server)).expect("client should build")
}

/// Serves `token` from the token endpoint, expecting exactly `calls` requests.
pub async fn mount_token(server: &MockServer, token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("client_secret=client-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "Bearer"
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Requests the server received, minus the ones to the token endpoint.
pub async fn api_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() != TOKEN_PATH)
        .collect()
}
