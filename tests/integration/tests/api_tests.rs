//! REST client integration tests
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chat_api::{HttpClient, HttpError};
use chat_common::ClientConfig;
use integration_tests::MockApi;

fn client_for(api: &MockApi) -> HttpClient {
    HttpClient::new(&ClientConfig::new("secret").with_api_base_url(api.base_url())).unwrap()
}

#[tokio::test]
async fn test_get_gateway_url() {
    let api = MockApi::start("ws://gateway.test").await.unwrap();
    let http = client_for(&api);

    assert_eq!(http.get_gateway_url().await.unwrap(), "ws://gateway.test");
    assert_eq!(api.requests()[0].path, "/gateway");
}

#[tokio::test]
async fn test_rate_limited_request() {
    let api = MockApi::start("ws://gateway.test").await.unwrap();
    api.set_rate_limited(true);
    let http = client_for(&api);

    let err = http.get_gateway_url().await.unwrap_err();
    assert!(matches!(err, HttpError::TooManyRequests(_)));
    assert!(err.is_rate_limited());
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.retry_after(), Some(0.5));
}

#[tokio::test]
async fn test_not_found_carries_remote_body() {
    let api = MockApi::start("ws://gateway.test").await.unwrap();
    let http = client_for(&api);
    http.set_application_id(chat_core::Snowflake::new(11));

    let err = http
        .create_global_command(&serde_json::json!({"name": "x"}))
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::NotFound(_)));
    let remote = err.remote().unwrap();
    assert_eq!(remote.status, 404);
    assert_eq!(remote.path, "/applications/11/commands");
    assert_eq!(remote.body.message, "404: Not Found");
}

#[tokio::test]
async fn test_commands_need_application_id() {
    let api = MockApi::start("ws://gateway.test").await.unwrap();
    let http = client_for(&api);

    let err = http.overwrite_global_commands::<serde_json::Value>(&[]).await.unwrap_err();
    assert!(matches!(err, HttpError::MissingApplicationId));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_rate_limited_command_overwrite() {
    let api = MockApi::start("ws://gateway.test").await.unwrap();
    api.set_rate_limited(true);
    let http = client_for(&api);
    http.set_application_id(chat_core::Snowflake::new(11));

    let err = http
        .overwrite_global_commands(&[serde_json::json!({"name": "ping", "description": "Pong!", "type": 1})])
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::TooManyRequests(_)));
    assert_eq!(api.requests()[0].path, "/applications/11/commands");
}

#[tokio::test]
async fn test_create_guild_command_posts_to_guild_path() {
    let api = MockApi::start("ws://gateway.test").await.unwrap();
    let http = client_for(&api);
    http.set_application_id(chat_core::Snowflake::new(11));

    let command = serde_json::json!({"name": "ban", "description": "Ban a member", "type": 1});
    let err = http
        .create_guild_command(chat_core::Snowflake::new(7), &command)
        .await
        .unwrap_err();

    // The mock only echoes overwrites; one-off creates fall through to 404
    assert!(matches!(err, HttpError::NotFound(_)));
    let request = &api.requests()[0];
    assert_eq!(request.method, axum::http::Method::POST);
    assert_eq!(request.path, "/applications/11/guilds/7/commands");
    assert_eq!(request.body.as_ref(), Some(&command));
}
