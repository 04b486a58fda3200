//! Webhook endpoint integration tests

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use common::harness;
use docket_gateway::MessageCatalog;
use docket_gateway::api::{self, ApiState};

/// Build the application router over a test harness
fn build_router(h: &common::TestHarness, secret: Option<&str>) -> axum::Router {
    let state = Arc::new(ApiState {
        engine: h.engine.clone(),
        webhook_secret: secret.map(String::from),
        db: h.db.clone(),
    });
    api::router(state)
}

/// A minimal text-message update envelope
fn text_update(chat_id: i64, text: &str) -> String {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": {"id": chat_id, "type": "private"},
            "from": {"id": 5, "is_bot": false, "first_name": "Ada"},
            "text": text,
            "date": 1_700_000_000
        }
    })
    .to_string()
}

fn webhook_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhooks/telegram")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Wait until the mock gateway has sent at least `count` messages to a chat
async fn wait_for_messages(h: &common::TestHarness, chat_id: i64, count: usize) -> Vec<String> {
    for _ in 0..100 {
        let messages = h.gateway.messages_for(chat_id);
        if messages.len() >= count {
            return messages;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "gave up waiting for {count} messages; got {:?}",
        h.gateway.messages_for(chat_id)
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let h = harness(false, false);
    let app = build_router(&h, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let h = harness(false, false);
    let app = build_router(&h, None);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_update_without_message_is_acknowledged() {
    let h = harness(false, false);
    let app = build_router(&h, None);

    let response = app
        .oneshot(webhook_request(json!({"update_id": 7}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["ok"], true);
}

#[tokio::test]
async fn test_webhook_secret_mismatch_is_rejected() {
    let h = harness(false, false);
    let app = build_router(&h, Some("s3cret"));

    let response = app
        .oneshot(webhook_request(text_update(1, "hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_webhook_secret_match_is_accepted() {
    let h = harness(false, false);
    let app = build_router(&h, Some("s3cret"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/telegram")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-telegram-bot-api-secret-token", "s3cret")
        .body(Body::from(text_update(1, "hi")))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_greeting_update_is_processed_in_background() {
    let h = harness(false, false);
    let app = build_router(&h, None);
    let messages = MessageCatalog::default();

    let response = app
        .oneshot(webhook_request(text_update(42, "hi")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The handler returns before processing; the replies land shortly after
    let sent = wait_for_messages(&h, 42, 2).await;
    assert_eq!(sent, vec![messages.welcome.clone(), messages.request_lawyer_id.clone()]);
}

#[tokio::test]
async fn test_document_update_reaches_the_engine() {
    let h = harness(false, false);
    let app = build_router(&h, None);

    // Walk the chat into the evidence state first
    common::drive_to_evidence(&h, 9).await;
    let already_sent = h.gateway.messages_for(9).len();

    let update = json!({
        "update_id": 2,
        "message": {
            "message_id": 11,
            "chat": {"id": 9, "type": "private"},
            "from": {"id": 5, "is_bot": false, "first_name": "Ada"},
            "document": {
                "file_id": "file-77",
                "file_unique_id": "u77",
                "file_name": "scan.pdf",
                "mime_type": "application/pdf",
                "file_size": 1024
            },
            "date": 1_700_000_000
        }
    })
    .to_string();

    let response = app.oneshot(webhook_request(update)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = wait_for_messages(&h, 9, already_sent + 1).await;
    assert_eq!(sent.last(), Some(&MessageCatalog::default().document_received));
    assert_eq!(h.gateway.download_count(), 1);
}

#[tokio::test]
async fn test_bot_messages_are_ignored() {
    let h = harness(false, false);
    let app = build_router(&h, None);

    let update = json!({
        "update_id": 3,
        "message": {
            "message_id": 12,
            "chat": {"id": 1, "type": "private"},
            "from": {"id": 6, "is_bot": true, "first_name": "OtherBot"},
            "text": "hi",
            "date": 1_700_000_000
        }
    })
    .to_string();

    let response = app.oneshot(webhook_request(update)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.gateway.messages_for(1).is_empty());
}
