#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test — panics are the assertion mechanism")]

use std::time::Duration;

use byblia_core::agent::{AgentChunk, AgentError, GenerationRequest, ModelAgent};
use byblia_core::OpenAiCompatibleAgent;
use byblia_types::models::config::ModelConfig;
use byblia_types::ChatMessage;
use futures::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn agent_for(server: &MockServer, system_prompt: Option<&str>) -> OpenAiCompatibleAgent {
    let config = ModelConfig {
        api_key: "test-key".to_string(),
        base_url: format!("{}/", server.uri()),
        system_prompt: system_prompt.map(str::to_string),
        ..ModelConfig::default()
    };
    OpenAiCompatibleAgent::new(&config).expect("client builds")
}

fn request() -> GenerationRequest {
    GenerationRequest {
        prompt: "Qual é o significado de João 3:16?".to_string(),
        history: vec![ChatMessage::user("Olá"), ChatMessage::assistant("Paz seja contigo.")],
        temperature: 0.5,
    }
}

fn sse_body(deltas: &[&str], total_tokens: u32) -> String {
    let mut body = String::new();
    for delta in deltas {
        let chunk = serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": delta } }] });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    let usage = serde_json::json!({ "choices": [], "usage": { "total_tokens": total_tokens } });
    body.push_str(&format!(": keep-alive\n\ndata: {}\n\ndata: [DONE]\n\n", usage));
    body
}

async fn collect(agent: &OpenAiCompatibleAgent) -> Vec<Result<AgentChunk, AgentError>> {
    agent.stream(&request()).await.expect("stream opens").collect().await
}

#[tokio::test]
async fn test_stream_parses_deltas_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-chat",
            "stream": true,
            "stream_options": { "include_usage": true },
            "temperature": 0.5,
            "messages": [
                { "role": "system", "content": "Você é um conselheiro." },
                { "role": "user", "content": "Olá" },
                { "role": "assistant", "content": "Paz seja contigo." },
                { "role": "user", "content": "Qual é o significado de João 3:16?" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["Porque ", "Deus ", "amou"], 42), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let agent = agent_for(&server, Some("Você é um conselheiro."));
    let chunks: Vec<AgentChunk> =
        collect(&agent).await.into_iter().map(|c| c.expect("chunk ok")).collect();

    assert_eq!(chunks, vec![
        AgentChunk::Text("Porque ".to_string()),
        AgentChunk::Text("Deus ".to_string()),
        AgentChunk::Text("amou".to_string()),
        AgentChunk::Usage(42),
    ]);
}

#[tokio::test]
async fn test_non_success_status_is_reported_before_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"invalid key\"}"))
        .mount(&server)
        .await;

    let agent = agent_for(&server, None);
    let result = agent.stream(&request()).await;

    match result {
        Err(AgentError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid key"));
        },
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected a status error"),
    }
}

#[tokio::test]
async fn test_error_payload_mid_stream_fails_the_stream() {
    let server = MockServer::start().await;
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Por\"}}]}\n\n\
                data: {\"error\":{\"message\":\"overloaded\"}}\n\n";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let items = collect(&agent_for(&server, None)).await;

    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], Ok(AgentChunk::Text(ref t)) if t == "Por"));
    assert!(matches!(items[1], Err(AgentError::Upstream(_))));
}

#[tokio::test]
async fn test_garbage_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("data: not-json\n\n", "text/event-stream"))
        .mount(&server)
        .await;

    let items = collect(&agent_for(&server, None)).await;

    assert!(matches!(items.as_slice(), [Err(AgentError::Decode(_))]));
}

#[tokio::test]
async fn test_complete_returns_text_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Deus é amor." } }],
            "usage": { "prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = agent_for(&server, None).complete(&request()).await.expect("completion");

    assert_eq!(completion.text, "Deus é amor.");
    assert_eq!(completion.usage, Some(25));
}

#[tokio::test]
async fn test_complete_with_blank_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "  " } }]
        })))
        .mount(&server)
        .await;

    let result = agent_for(&server, None).complete(&request()).await;

    assert!(matches!(result, Err(AgentError::EmptyResponse)));
}

#[tokio::test]
async fn test_complete_is_bounded_by_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({ "choices": [{ "message": { "content": "tarde" } }] })),
        )
        .mount(&server)
        .await;
    let config = ModelConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        request_timeout_secs: 1,
        ..ModelConfig::default()
    };
    let agent = OpenAiCompatibleAgent::new(&config).expect("client builds");

    let result = agent.complete(&request()).await;

    assert!(matches!(result, Err(AgentError::Timeout(d)) if d == Duration::from_secs(1)));
}
