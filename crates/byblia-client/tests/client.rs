#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test — panics are the assertion mechanism")]

use byblia_client::{BybliaClient, ChatEvent, ClientConfig, ClientError, RetryConfig};
use byblia_types::ChatMessage;
use futures::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> BybliaClient {
    BybliaClient::new(ClientConfig {
        base_url: server.uri(),
        origin: Some("https://byblia.vercel.app".to_string()),
        retry: RetryConfig { max_retries: 1, base_delay_ms: 1, max_delay_ms: 5 },
        ..ClientConfig::default()
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_chat_stream_decodes_events_until_done() {
    let server = MockServer::start().await;
    let body = "data: {\"type\":\"chunk\",\"content\":\"Porque \"}\n\n\
                data: {\"type\":\"chunk\",\"content\":\"Deus amou\"}\n\n\
                data: {\"type\":\"complete\",\"token_usage\":12,\"temperature\":0.61,\"interaction_id\":8,\
                \"message_history\":[{\"role\":\"user\",\"content\":\"Oi\"},{\"role\":\"assistant\",\"content\":\"Porque Deus amou\"}]}\n\n\
                data: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("origin", "https://byblia.vercel.app"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "Oi",
            "messageHistory": [{ "role": "user", "content": "antes" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = client_for(&server)
        .chat_stream("Oi", Some(vec![ChatMessage::user("antes")]))
        .await
        .expect("stream opens")
        .map(|e| e.expect("event"))
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], ChatEvent::Chunk("Porque ".to_string()));
    match &events[2] {
        ChatEvent::Complete(done) => {
            assert_eq!(done.interaction_id, 8);
            assert_eq!(done.token_usage, 12);
            assert_eq!(done.message_history.as_ref().map(Vec::len), Some(2));
        },
        other => panic!("expected completion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_surfaces_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "60")
                .set_body_json(serde_json::json!({ "detail": "Too many requests" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).chat_stream("Oi", None).await;

    assert!(matches!(result, Err(ClientError::RateLimited { retry_after: Some(60) })));
}

#[tokio::test]
async fn test_server_errors_are_retried_then_give_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let result = client_for(&server).chat_stream("Oi", None).await;

    assert!(matches!(result, Err(ClientError::Timeout(2))));
}

#[tokio::test]
async fn test_validation_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "detail": "Invalid request: Prompt cannot be empty" })),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).chat_stream("   ", None).await;

    match result {
        Err(ClientError::ServerError { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("Prompt cannot be empty"));
        },
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn test_send_feedback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_partial_json(serde_json::json!({ "interactionId": 8, "feedback": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Feedback recorded successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).send_feedback(8, true).await.expect("feedback accepted");

    assert!(response.success);
}

#[tokio::test]
async fn test_recent_interactions_passes_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interactions"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server).recent_interactions(3).await.expect("listed");

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_discovered_client_sends_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(header("origin", "https://byblia.vercel.app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Feedback recorded successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = vec!["http://127.0.0.1:1".to_string(), server.uri()];
    let client =
        BybliaClient::discover(&candidates, Some("https://byblia.vercel.app".to_string()))
            .await
            .expect("second candidate answers");

    assert_eq!(client.config().base_url, server.uri());
    client.send_feedback(3, false).await.expect("origin accepted");
}

#[tokio::test]
async fn test_discovery_without_live_candidate() {
    let result = BybliaClient::discover(&["http://127.0.0.1:1".to_string()], None).await;
    assert!(matches!(result, Err(ClientError::ServerNotFound)));
}
