//! Integration tests for the HTTP request path
//!
//! Runs `GraphQLClient` with the reqwest transport against a mockito server.

use graphql::{variables, Error, GraphQLClient};
use mockito::Matcher;
use serde_json::{json, Value};

#[tokio::test]
async fn test_request_returns_data() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_header("content-type", "application/json")
        .match_header("authorization", "Bearer t")
        .match_body(Matcher::Json(json!({ "query": "{ viewer { login } }" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":{"viewer":{"login":"octocat"}}}"#)
        .create_async()
        .await;

    let mut client = GraphQLClient::new(format!("{}/graphql", server.url()));
    client.set_header("Authorization", "Bearer t");

    let data: Value = client.request("{ viewer { login } }", None).await.unwrap();
    assert_eq!(data, json!({ "viewer": { "login": "octocat" } }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_raw_request_returns_status_and_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Json(json!({
            "query": "query($id: ID!) { node(id: $id) { id } }",
            "variables": { "id": "n1" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_header("x-request-id", "req-42")
        .with_body(r#"{"data":{"node":{"id":"n1"}},"extensions":{"cost":1}}"#)
        .create_async()
        .await;

    let response = graphql::raw_request(
        &format!("{}/graphql", server.url()),
        "query($id: ID!) { node(id: $id) { id } }",
        variables(json!({ "id": "n1" })),
    )
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({ "node": { "id": "n1" } }));
    assert_eq!(response.extensions, Some(json!({ "cost": 1 })));
    assert_eq!(response.headers.get("x-request-id"), Some("req-42"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_graphql_errors_fail() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":null,"errors":[{"message":"Field 'x' doesn't exist"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let client = GraphQLClient::new(format!("{}/graphql", server.url()));

    let err = client.request::<Value>("{ x }", None).await.unwrap_err();
    let client_error = err.client_error().expect("client error");
    assert_eq!(client_error.response.status, 200);
    assert_eq!(
        client_error.response.errors(),
        Some(&vec![json!({ "message": "Field 'x' doesn't exist" })])
    );
    assert!(client_error.response.headers.is_none());
    assert_eq!(client_error.message(), "Field 'x' doesn't exist");

    let err = client.raw_request("{ x }", None).await.unwrap_err();
    let client_error = err.client_error().expect("client error");
    assert!(client_error.response.headers.is_some());
    assert_eq!(client_error.request.query, "{ x }");
}

#[tokio::test]
async fn test_text_error_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/graphql")
        .with_status(503)
        .with_header("content-type", "text/plain")
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let err = graphql::raw_request(&format!("{}/graphql", server.url()), "{ x }", None)
        .await
        .unwrap_err();

    let client_error = err.client_error().expect("client error");
    let merged = client_error.response.to_json();
    assert_eq!(merged["error"], "Service Unavailable");
    assert_eq!(merged["status"], 503);
    assert_eq!(merged["headers"]["content-type"], "text/plain");
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{broken")
        .create_async()
        .await;

    let err = graphql::request::<Value>(&format!("{}/graphql", server.url()), "{ x }", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let err = graphql::request::<Value>("http://127.0.0.1:9/graphql", "{ x }", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
