//! Integration tests: the send API client and emitter against a local mock of the Graph API.

use axum::{extract::Query, extract::State, http::StatusCode, routing::post, Json, Router};
use messenger::channels::messenger::{Delivery, DeliveryError, MessengerEmitter, OutboundMessage, SendApiClient};
use messenger::emission::{EmissionAction, Emitter};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Captured = Arc<Mutex<Vec<(HashMap<String, String>, serde_json::Value)>>>;

async fn capture(
    State(captured): State<Captured>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    captured.lock().unwrap().push((query, body));
    Json(serde_json::json!({"recipient_id": "U1", "message_id": "mid.1"}))
}

async fn reject() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, r#"{"error":{"message":"Invalid OAuth access token."}}"#)
}

/// Serve the mock on an ephemeral port; returns its base URL.
async fn start_mock() -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v2.6/me/messages", post(capture))
        .route("/bad/me/messages", post(reject))
        .with_state(captured.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}", addr), captured)
}

#[tokio::test]
async fn posts_json_with_access_token_query() {
    let (base, captured) = start_mock().await;
    let client = SendApiClient::new(format!("{}/v2.6/me/messages", base), Some("PAGE_TOKEN".to_string()));
    client.deliver(&OutboundMessage::text("U1", "hello")).await.unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let (query, body) = &captured[0];
    assert_eq!(query.get("access_token").map(String::as_str), Some("PAGE_TOKEN"));
    assert_eq!(
        body,
        &serde_json::json!({"recipient": {"id": "U1"}, "message": {"text": "hello"}})
    );
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let (base, _captured) = start_mock().await;
    let client = SendApiClient::new(format!("{}/bad/me/messages", base), Some("PAGE_TOKEN".to_string()));
    let err = client
        .deliver(&OutboundMessage::text("U1", "hello"))
        .await
        .unwrap_err();
    match err {
        DeliveryError::Api { status, body } => {
            assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
            assert!(body.contains("Invalid OAuth"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn emitter_sends_typing_then_quick_replies() {
    let (base, captured) = start_mock().await;
    let client = Arc::new(SendApiClient::new(
        format!("{}/v2.6/me/messages", base),
        Some("PAGE_TOKEN".to_string()),
    ));
    let emitter = MessengerEmitter::new("U1", client, Duration::from_millis(20));
    emitter
        .emit(EmissionAction::quick_replies("Continue?", ["Yes", "No"]))
        .await
        .unwrap();

    let bodies: Vec<serde_json::Value> = captured.lock().unwrap().iter().map(|(_, b)| b.clone()).collect();
    assert_eq!(bodies.len(), 2);
    assert_eq!(
        bodies[0],
        serde_json::json!({"recipient": {"id": "U1"}, "sender_action": "typing_on", "message": null})
    );
    assert_eq!(
        bodies[1],
        serde_json::json!({
            "recipient": {"id": "U1"},
            "message": {
                "text": "Continue?",
                "quick_replies": [
                    {"content_type": "text", "title": "Yes", "payload": "Yes"},
                    {"content_type": "text", "title": "No", "payload": "No"}
                ]
            }
        })
    );
}
