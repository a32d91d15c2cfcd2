use mockito::{Matcher, Server};
use serde_json::json;
use tokio::net::TcpListener;

use super::common::fixed_snapshot;

use sysrelay::chat::discord::DiscordClient;
use sysrelay::chat::{ChannelHandle, ChatClient};
use sysrelay::core::Report;
use sysrelay::RelayError;

fn channel(id: &str) -> ChannelHandle {
    ChannelHandle {
        id: id.to_string(),
        name: None,
    }
}

/// Base URL of a port nothing listens on.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_resolve_channel() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/channels/123")
        .match_header("authorization", "Bot test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"123","type":0,"name":"status"}"#)
        .create_async()
        .await;

    let client = DiscordClient::with_base_url("test-token", &server.url()).unwrap();
    let handle = client.resolve_channel("123").await.unwrap();

    assert_eq!(handle.id, "123");
    assert_eq!(handle.name.as_deref(), Some("status"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_channel() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/channels/999")
        .with_status(404)
        .with_body(r#"{"message":"Unknown Channel","code":10003}"#)
        .create_async()
        .await;

    let client = DiscordClient::with_base_url("test-token", &server.url()).unwrap();
    let result = client.resolve_channel("999").await;

    assert!(matches!(result, Err(RelayError::ChannelNotFound(_))));
}

#[tokio::test]
async fn test_lookup_server_error_is_channel_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/channels/123")
        .with_status(502)
        .with_body("upstream down")
        .create_async()
        .await;

    let client = DiscordClient::with_base_url("test-token", &server.url()).unwrap();

    match client.resolve_channel("123").await {
        Err(RelayError::ChannelNotFound(msg)) => {
            assert!(msg.contains("502"));
            assert!(msg.contains("upstream down"));
        }
        other => panic!("expected ChannelNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_api_lookup_is_channel_not_found() {
    let client = DiscordClient::with_base_url("test-token", &closed_port_url().await).unwrap();

    let result = client.resolve_channel("123").await;
    assert!(matches!(result, Err(RelayError::ChannelNotFound(_))));
}

#[tokio::test]
async fn test_send_posts_embed() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/channels/123/messages")
        .match_header("authorization", "Bot test-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "embeds": [{
                "title": "System Information 🖥️",
                "color": 0x1E90FF,
                "footer": { "text": "Last updated: 10/16/2026, 9:05:07 AM" }
            }]
        })))
        .with_status(200)
        .with_body(r#"{"id":"1"}"#)
        .create_async()
        .await;

    let client = DiscordClient::with_base_url("test-token", &server.url()).unwrap();
    let report = Report::from_snapshot(&fixed_snapshot());

    client.send(&channel("123"), &report).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_send() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/channels/123/messages")
        .with_status(500)
        .with_body(r#"{"message":"boom"}"#)
        .create_async()
        .await;

    let client = DiscordClient::with_base_url("test-token", &server.url()).unwrap();
    let report = Report::from_snapshot(&fixed_snapshot());

    match client.send(&channel("123"), &report).await {
        Err(RelayError::SendFailed(msg)) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("expected SendFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_send_failure() {
    let client = DiscordClient::with_base_url("test-token", &closed_port_url().await).unwrap();
    let report = Report::from_snapshot(&fixed_snapshot());

    let result = client.send(&channel("123"), &report).await;
    assert!(matches!(result, Err(RelayError::SendFailed(_))));
}
