//! Integration tests for HttpTransport against a local mock GraphQL server
//!
//! These tests verify:
//! - Request body shape (operation name, variables, omitted `name`)
//! - Configured headers are sent
//! - HTTP, GraphQL and decode failures map to the right QueryError
//! - Timeouts
//! - Avatar downloads over the same client

use httpmock::prelude::*;
use rickdex::AppConfig;
use rickdex::models::{NavigationParam, QueryError};
use rickdex::services::{AvatarSource, GraphQlClient, HttpTransport};
use serde_json::json;
use std::time::Duration;

fn client_for(server: &MockServer) -> GraphQlClient<HttpTransport> {
    client_with(server, |_| {})
}

fn client_with(
    server: &MockServer,
    customize: impl FnOnce(&mut AppConfig),
) -> GraphQlClient<HttpTransport> {
    let mut config = AppConfig {
        endpoint: server.url("/graphql"),
        ..AppConfig::default()
    };
    customize(&mut config);
    GraphQlClient::new(HttpTransport::new(&config).unwrap())
}

#[tokio::test]
async fn test_unfiltered_search_omits_name_variable() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("content-type", "application/json")
                .body_contains(r#""operationName":"GetCharacters""#)
                .body_contains(r#""variables":{}"#);
            then.status(200).json_body(json!({
                "data": { "characters": { "results": [
                    { "id": "1", "name": "Rick Sanchez", "status": "Alive", "species": "Human", "image": "" }
                ] } }
            }));
        })
        .await;

    let page = client_for(&server).characters(None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].name, "Rick Sanchez");
}

#[tokio::test]
async fn test_filtered_search_sends_name() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains(r#""variables":{"name":"rick"}"#);
            then.status(200)
                .json_body(json!({ "data": { "characters": { "results": [] } } }));
        })
        .await;

    let page = client_for(&server).characters(Some("rick")).await.unwrap();

    mock.assert_async().await;
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_character_lookup_and_null_character() {
    let server = MockServer::start_async().await;
    let found = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains(r#""variables":{"id":"1"}"#);
            then.status(200).json_body(json!({
                "data": { "character": {
                    "id": "1",
                    "name": "Rick Sanchez",
                    "status": "Alive",
                    "species": "Human",
                    "type": "",
                    "gender": "Male",
                    "origin": { "name": "Earth (C-137)" },
                    "location": null,
                    "image": "",
                    "episode": [{ "id": "1", "name": "Pilot", "episode": "S01E01" }]
                } }
            }));
        })
        .await;
    let missing = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains(r#""variables":{"id":"99999"}"#);
            then.status(200).json_body(json!({ "data": { "character": null } }));
        })
        .await;

    let client = client_for(&server);

    let lookup = client
        .character(&NavigationParam::parse("1").unwrap())
        .await
        .unwrap();
    let rick = lookup.character.unwrap();
    assert_eq!(rick.episode[0].display_line(), "S01E01 - Pilot");
    assert!(rick.location.is_none());

    let lookup = client
        .character(&NavigationParam::parse("99999").unwrap())
        .await
        .unwrap();
    assert!(lookup.character.is_none());

    found.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_extra_headers_are_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("x-client", "rickdex-tests");
            then.status(200)
                .json_body(json!({ "data": { "episodes": { "results": [] } } }));
        })
        .await;

    let client = client_with(&server, |config| {
        config
            .extra_headers
            .insert("x-client".into(), "rickdex-tests".into());
    });
    client.episodes().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500).body("internal error");
        })
        .await;

    let err = client_for(&server).episodes().await.unwrap_err();
    assert_eq!(err, QueryError::Http { status: 500 });
    assert_eq!(err.display_message(), "Error: Server responded with HTTP 500");
}

#[tokio::test]
async fn test_graphql_errors_keep_messages_even_with_4xx() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(400).json_body(json!({
                "errors": [
                    { "message": "Variable \"$id\" of required type \"ID!\" was not provided." }
                ]
            }));
        })
        .await;

    let err = client_for(&server)
        .character(&NavigationParam::parse("1").unwrap())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::GraphQl(vec![
            "Variable \"$id\" of required type \"ID!\" was not provided.".into()
        ])
    );
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client_for(&server).characters(None).await.unwrap_err();
    assert!(matches!(err, QueryError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "data": { "episodes": { "results": [] } } }));
        })
        .await;

    let client = client_with(&server, |config| config.request_timeout_secs = 1);
    let err = client.episodes().await.unwrap_err();
    assert_eq!(err, QueryError::Timeout(Duration::from_secs(1)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let config = AppConfig {
        // Port 9 (discard) is almost never listening locally
        endpoint: "http://127.0.0.1:9/graphql".into(),
        request_timeout_secs: 2,
        ..AppConfig::default()
    };
    let client = GraphQlClient::new(HttpTransport::new(&config).unwrap());

    let err = client.episodes().await.unwrap_err();
    assert!(
        matches!(err, QueryError::Transport(_) | QueryError::Timeout(_)),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn test_avatar_fetch_returns_body_bytes() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/character/avatar/1.jpeg");
            then.status(200)
                .header("content-type", "image/jpeg")
                .body([0xFF, 0xD8, 0xFF, 0xE0]);
        })
        .await;

    let transport = HttpTransport::new(&AppConfig::default()).unwrap();
    let bytes = transport
        .fetch(&server.url("/api/character/avatar/1.jpeg"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
}

#[tokio::test]
async fn test_missing_avatar_is_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/character/avatar/99999.jpeg");
            then.status(404);
        })
        .await;

    let transport = HttpTransport::new(&AppConfig::default()).unwrap();
    let err = transport
        .fetch(&server.url("/api/character/avatar/99999.jpeg"))
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::Http { status: 404 });
}
