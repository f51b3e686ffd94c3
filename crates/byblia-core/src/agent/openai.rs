use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use byblia_types::models::config::ModelConfig;
use byblia_types::{ChatMessage, MessageRole};

use super::{
    AgentChunk, AgentCompletion, AgentError, GenerationHandle, GenerationRequest, ModelAgent,
    SseLineDecoder,
};
use crate::utils::{truncate_chars, UPSTREAM_BODY_LOG_CHARS};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Streamed answers have no total deadline: only the wait for response
/// headers and each gap between body reads are bounded.
pub struct OpenAiCompatibleAgent {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    idle_timeout: Duration,
    api_key: String,
    model_id: String,
    system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl StreamChunk {
    fn into_agent_chunks(self) -> Result<Vec<AgentChunk>, AgentError> {
        if let Some(error) = self.error {
            return Err(AgentError::Upstream(truncate_chars(
                &error.to_string(),
                UPSTREAM_BODY_LOG_CHARS,
            )));
        }

        let mut chunks: Vec<AgentChunk> = self
            .choices
            .into_iter()
            .filter_map(|choice| choice.delta.content)
            .filter(|text| !text.is_empty())
            .map(AgentChunk::Text)
            .collect();

        if let Some(usage) = self.usage.filter(|u| u.total_tokens > 0) {
            chunks.push(AgentChunk::Usage(usage.total_tokens));
        }
        Ok(chunks)
    }
}

/// Decode an upstream SSE body into agent chunks.
///
/// Fails with [`AgentError::Timeout`] when no bytes arrive for `idle_timeout`.
pub(crate) fn decode_stream<S, E>(bytes: S, idle_timeout: Duration) -> GenerationHandle
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<AgentError> + Send + 'static,
{
    Box::pin(stream! {
        let mut bytes = std::pin::pin!(bytes);
        let mut decoder = SseLineDecoder::default();
        let mut exhausted = false;

        while !exhausted {
            let next = match tokio::time::timeout(idle_timeout, bytes.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(idle_secs = idle_timeout.as_secs(), "Upstream stream went silent");
                    yield Err(AgentError::Timeout(idle_timeout));
                    return;
                },
            };

            let payloads = match next {
                Some(Ok(chunk)) => match decoder.feed(&chunk) {
                    Ok(payloads) => payloads,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                },
                Some(Err(e)) => {
                    yield Err(e.into());
                    return;
                },
                None => {
                    exhausted = true;
                    decoder.finish().into_iter().collect()
                },
            };

            for payload in payloads {
                if payload == "[DONE]" {
                    return;
                }
                match decode_payload(&payload) {
                    Ok(chunks) => {
                        for chunk in chunks {
                            yield Ok(chunk);
                        }
                    },
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                }
            }
        }
    })
}

fn decode_payload(payload: &str) -> Result<Vec<AgentChunk>, AgentError> {
    serde_json::from_str::<StreamChunk>(payload)
        .map_err(|e| AgentError::Decode(e.to_string()))
        .and_then(StreamChunk::into_agent_chunks)
}

impl OpenAiCompatibleAgent {
    pub fn new(config: &ModelConfig) -> Result<Self, AgentError> {
        let client =
            reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT).tcp_nodelay(true).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            idle_timeout: Duration::from_secs(config.stream_idle_timeout_secs.max(1)),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .filter(|prompt| !prompt.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn messages<'a>(&'a self, request: &'a GenerationRequest) -> Vec<WireMessage<'a>> {
        let system = self
            .system_prompt
            .as_deref()
            .map(|content| WireMessage { role: MessageRole::System, content });
        let history = request
            .history
            .iter()
            .map(|ChatMessage { role, content }| WireMessage { role: *role, content });
        let prompt = WireMessage { role: MessageRole::User, content: &request.prompt };

        system.into_iter().chain(history).chain(std::iter::once(prompt)).collect()
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::Response, AgentError> {
        let body = CompletionBody {
            model: &self.model_id,
            messages: self.messages(request),
            temperature: request.temperature,
            stream,
            stream_options: stream.then_some(StreamOptions { include_usage: true }),
        };

        let send = self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&body).send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| AgentError::Timeout(self.request_timeout))??;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = truncate_chars(&text, UPSTREAM_BODY_LOG_CHARS);
            tracing::warn!(status = status.as_u16(), body = %body, "Upstream rejected generation request");
            return Err(AgentError::Status { status: status.as_u16(), body });
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelAgent for OpenAiCompatibleAgent {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn stream(&self, request: &GenerationRequest) -> Result<GenerationHandle, AgentError> {
        let response = self.send(request, true).await?;
        Ok(decode_stream(response.bytes_stream(), self.idle_timeout))
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<AgentCompletion, AgentError> {
        let call = async {
            let response = self.send(request, false).await?;
            response.json::<CompletionResponse>().await.map_err(|e| AgentError::Decode(e.to_string()))
        };
        // Total deadline, body included.
        let parsed = tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| AgentError::Timeout(self.request_timeout))??;

        let text = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AgentError::EmptyResponse)?;

        Ok(AgentCompletion {
            text,
            usage: parsed.usage.map(|u| u.total_tokens).filter(|total| *total > 0),
        })
    }
}
