//! Telegram client integration tests against a mock Bot API.

mod integration;
use integration::common::mock_telegram::MockTelegramServer;

use hlwatch_notify::{ChatTransport, NotifyError, TelegramClient, TelegramConfig};
use serde_json::json;
use std::time::Duration;

fn client(server: &MockTelegramServer) -> TelegramClient {
    let config = TelegramConfig::new("123456:test-token")
        .with_api_base(server.url())
        .with_timeouts(Duration::from_secs(1), Duration::from_secs(5));
    TelegramClient::new(config).unwrap()
}

#[tokio::test]
async fn test_send_message() {
    let server = MockTelegramServer::start().await;
    let client = client(&server);

    client.send_message(-100200, "<b>hello</b>").await.unwrap();

    let calls = server.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path_token, "bot123456:test-token");
    assert_eq!(calls[0].method, "sendMessage");
    assert_eq!(
        calls[0].body,
        json!({
            "chat_id": -100200,
            "text": "<b>hello</b>",
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        })
    );

    server.shutdown();
}

#[tokio::test]
async fn test_send_message_api_error() {
    let server = MockTelegramServer::start().await;
    server
        .fail_sends(
            400,
            json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}),
        )
        .await;
    let client = client(&server);

    let err = client.send_message(1, "hi").await.unwrap_err();
    assert_eq!(
        err,
        NotifyError::Api {
            status: 400,
            description: "Bad Request: chat not found".into()
        }
    );

    server.shutdown();
}

#[tokio::test]
async fn test_get_updates_through_trait() {
    let server = MockTelegramServer::start().await;
    server
        .push_updates(json!([
            {"update_id": 7, "message": {
                "message_id": 1, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false},
                "text": "/list"
            }},
            {"update_id": 8, "message": {
                "message_id": 2, "date": 0,
                "chat": {"id": 43, "type": "private"},
                "text": "/help"
            }}
        ]))
        .await;
    let client = client(&server);

    let updates = ChatTransport::get_updates(&client, None).await.unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].update_id, 8);
    assert_eq!(
        updates[0].message.as_ref().unwrap().text.as_deref(),
        Some("/list")
    );

    let updates = ChatTransport::get_updates(&client, Some(9)).await.unwrap();
    assert!(updates.is_empty());

    let calls = server.calls().await;
    assert_eq!(calls[0].body, json!({"timeout": 1, "allowed_updates": ["message"]}));
    assert_eq!(
        calls[1].body,
        json!({"offset": 9, "timeout": 1, "allowed_updates": ["message"]})
    );

    server.shutdown();
}

#[tokio::test]
async fn test_unreachable_api_hides_token() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = TelegramConfig::new("999:very-secret").with_api_base(format!("http://{addr}"));
    let client = TelegramClient::new(config).unwrap();

    let err = client.send_message(1, "hi").await.unwrap_err();
    assert!(matches!(err, NotifyError::Network(_)), "got {err:?}");
    assert!(!err.to_string().contains("very-secret"));
}
