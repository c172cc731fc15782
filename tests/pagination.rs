//! Continuation-token pagination against a mock API.

mod support;

use hyperproof::{ApiClient, Hyperproof, HyperproofError, ProofListing, QueryParams};
use serde_json::{json, Value};
use support::{api_requests, config_for, credentials, lazy_client, mount_token};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn records(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(|n| json!({"id": format!("p{n}"), "n": n})).collect()
}

fn page(range: std::ops::Range<usize>, token: Option<&str>) -> ResponseTemplate {
    let mut body = json!({"data": records(range)});
    if let Some(token) = token {
        body["continuationToken"] = json!(token);
    }
    ResponseTemplate::new(200).set_body_json(body)
}

/// Serves the first page at default priority and token-specific pages above it.
async fn mount_page(server: &MockServer, token: Option<&str>, response: ResponseTemplate) {
    let mock = Mock::given(method("GET")).and(path("/v1/proof/"));
    let mock = match token {
        Some(token) => mock
            .and(query_param("nextToken", token))
            .respond_with(response)
            .with_priority(1),
        None => mock.respond_with(response),
    };
    mock.expect(1).mount(server).await;
}

#[tokio::test]
async fn pages_are_concatenated_in_order() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(&server, None, page(0..500, Some("t1"))).await;
    mount_page(&server, Some("t1"), page(500..1000, Some("t2"))).await;
    mount_page(&server, Some("t2"), page(1000..1120, None)).await;

    let hyperproof = Hyperproof::new(lazy_client(&server));
    let proof = hyperproof
        .proof()
        .metadata_collection(&ProofListing::default())
        .await
        .unwrap();

    assert_eq!(proof.len(), 1120);
    assert_eq!(proof, records(0..1120));

    // Every page carries the caller's params; only the first lacks a token.
    let requests = api_requests(&server).await;
    assert_eq!(requests.len(), 3);
    for request in &requests {
        let query = request.url.query().unwrap_or_default();
        assert!(query.contains("limit=500"));
        assert!(query.contains("sortBy=uploadedOn"));
    }
    assert!(!requests[0].url.query().unwrap_or_default().contains("nextToken"));
}

#[tokio::test]
async fn single_page_without_token() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(&server, None, page(0..3, None)).await;

    let client = lazy_client(&server);
    let base = client.config().resource_base("proof");
    let proof = client
        .get_all_pages(&base, "/", QueryParams::new(), "proof metadata collection")
        .await
        .unwrap();
    assert_eq!(proof, records(0..3));
}

#[tokio::test]
async fn empty_token_ends_pagination() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(&server, None, page(0..2, Some(""))).await;

    let client = lazy_client(&server);
    let base = client.config().resource_base("proof");
    let proof = client
        .get_all_pages(&base, "/", QueryParams::new(), "proof metadata collection")
        .await
        .unwrap();
    assert_eq!(proof.len(), 2);
}

#[tokio::test]
async fn failed_page_aborts_the_collection() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(&server, None, page(0..500, Some("t1"))).await;
    mount_page(&server, Some("t1"), ResponseTemplate::new(500)).await;

    let hyperproof = Hyperproof::new(lazy_client(&server));
    let err = hyperproof
        .proof()
        .metadata_collection(&ProofListing::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HyperproofError::PaginationIntegrity { .. }));
    assert_eq!(err.to_string(), "no data returned from proof metadata collection");
}

#[tokio::test]
async fn page_without_data_is_an_integrity_error() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(
        &server,
        None,
        ResponseTemplate::new(200).set_body_json(json!({"items": []})),
    )
    .await;

    let client = lazy_client(&server);
    let base = client.config().resource_base("proof");
    let err = client
        .get_all_pages(&base, "/", QueryParams::new(), "proof metadata collection")
        .await
        .unwrap_err();
    assert!(matches!(err, HyperproofError::PaginationIntegrity { .. }));
}

#[tokio::test]
async fn non_string_token_is_an_integrity_error() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(
        &server,
        None,
        ResponseTemplate::new(200).set_body_json(json!({"data": [1, 2], "continuationToken": 7})),
    )
    .await;

    let client = lazy_client(&server);
    let base = client.config().resource_base("proof");
    let err = client
        .get_all_pages(&base, "/", QueryParams::new(), "proof metadata collection")
        .await
        .unwrap_err();
    assert!(matches!(err, HyperproofError::PaginationIntegrity { .. }));
}

#[tokio::test]
async fn repeated_token_is_reported_as_stalled() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(&server, None, page(0..2, Some("t1"))).await;
    mount_page(&server, Some("t1"), page(2..4, Some("t1"))).await;

    let client = lazy_client(&server);
    let base = client.config().resource_base("proof");
    let err = client
        .get_all_pages(&base, "/", QueryParams::new(), "proof metadata collection")
        .await
        .unwrap_err();
    assert!(matches!(err, HyperproofError::PaginationStalled { .. }));
}

#[tokio::test]
async fn page_limit_is_enforced() {
    let server = MockServer::start().await;
    mount_token(&server, "tok123", 1).await;
    mount_page(&server, None, page(0..2, Some("t1"))).await;
    mount_page(&server, Some("t1"), page(2..4, Some("t2"))).await;

    let config = config_for(&server).with_max_pages(2);
    let client = ApiClient::new(credentials(), config).unwrap();
    let base = client.config().resource_base("proof");
    let err = client
        .get_all_pages(&base, "/", QueryParams::new(), "proof metadata collection")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HyperproofError::PageLimitExceeded { max_pages: 2, .. }
    ));
}
