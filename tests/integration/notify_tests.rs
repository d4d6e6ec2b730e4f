//! Telegram delivery against a mock Bot API

use ad_watcher::notify::{Dispatcher, Notifier, NotifyError, TelegramNotifier};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:test-token";

fn ok_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}}))
}

fn notifier(mock_server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::new(TOKEN, mock_server.uri()).expect("Failed to build notifier")
}

fn method_path(method_name: &str) -> String {
    format!("/bot{}/{}", TOKEN, method_name)
}

fn image_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://img.example/{}.jpg", i))
        .collect()
}

#[tokio::test]
async fn test_send_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_partial_json(json!({
            "chat_id": 42,
            "text": "<b>hello</b>",
            "parse_mode": "HTML"
        })))
        .respond_with(ok_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    notifier(&mock_server)
        .send_text(42, "<b>hello</b>")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_single_image_uses_send_photo() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(method_path("sendPhoto")))
        .and(body_partial_json(json!({
            "chat_id": 42,
            "photo": "https://img.example/0.jpg",
            "caption": "caption",
            "parse_mode": "HTML"
        })))
        .respond_with(ok_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    notifier(&mock_server)
        .send_media_group(42, &image_urls(1), Some("caption"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_media_group_captions_first_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(method_path("sendMediaGroup")))
        .and(body_partial_json(json!({
            "chat_id": 42,
            "media": [
                {
                    "type": "photo",
                    "media": "https://img.example/0.jpg",
                    "caption": "caption",
                    "parse_mode": "HTML"
                },
                {"type": "photo", "media": "https://img.example/1.jpg"},
                {"type": "photo", "media": "https://img.example/2.jpg"}
            ]
        })))
        .respond_with(ok_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    notifier(&mock_server)
        .send_media_group(42, &image_urls(3), Some("caption"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&mock_server)
        .await;

    let error = notifier(&mock_server)
        .send_text(7, "hello")
        .await
        .unwrap_err();

    match error {
        NotifyError::Api {
            status,
            description,
        } => {
            assert_eq!(status, 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dispatcher_splits_large_albums() {
    let mock_server = MockServer::start().await;

    // 11 images: one full group of ten, then a single photo
    Mock::given(method("POST"))
        .and(path(method_path("sendMediaGroup")))
        .respond_with(ok_response())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(method_path("sendPhoto")))
        .and(body_partial_json(json!({"photo": "https://img.example/10.jpg"})))
        .respond_with(ok_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = Dispatcher::new(
        Arc::new(notifier(&mock_server)),
        Duration::from_millis(10),
    );
    dispatcher
        .send(42, "caption", &image_urls(11))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let photo: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert!(photo.get("caption").is_none());
}
