//! One chat request from upstream call to terminal event.
//!
//! ```text
//!  Idle ──► Streaming ──(exhausted)──────────────► Completing ──► Done
//!               │                                      ▲
//!               └──(error/empty)──► FallingBack ───────┘
//!                                       │
//!                                       └──(error)──► Done (Error event)
//! ```
//!
//! The session is a lazily polled stream. Dropping it (client disconnect)
//! drops the upstream handle and nothing further is emitted or persisted.

mod context;
mod temperature;


use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use uuid::Uuid;

use byblia_types::models::config::{SessionConfig, StreamConfig};
use byblia_types::{ChatError, CompletionMeta, NewInteraction, StreamEvent, TokenUsage};

use crate::agent::{AgentChunk, AgentError, GenerationRequest, ModelAgent};
use crate::recorder::InteractionRecorder;
use crate::utils::prompt_preview;

pub use context::{updated_history, RequestContext};
pub use temperature::TemperatureRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Completing,
    FallingBack,
    Done,
}

pub struct GenerationSession {
    id: Uuid,
    context: RequestContext,
    temperature: f64,
    agent: Arc<dyn ModelAgent>,
    recorder: InteractionRecorder,
    config: SessionConfig,
    stream_config: StreamConfig,
}

impl GenerationSession {
    /// New session with a temperature sampled from the configured range.
    pub fn new(
        context: RequestContext,
        agent: Arc<dyn ModelAgent>,
        recorder: InteractionRecorder,
        config: SessionConfig,
        stream_config: StreamConfig,
    ) -> Self {
        let temperature = TemperatureRange::from_config(&config).sample();
        Self { id: Uuid::new_v4(), context, temperature, agent, recorder, config, stream_config }
    }

    /// Use an explicit temperature, clamped into the configured range.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = TemperatureRange::from_config(&self.config).clamp(temperature);
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Run the session, yielding `Fragment*` then exactly one terminal event.
    pub fn into_events(self) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let Self { id, context, temperature, agent, recorder, config, stream_config } = self;

        stream! {
            let mut state = SessionState::Idle;
            let mut response = String::new();
            let mut reported_usage: Option<u32> = None;
            // Temperature of the call that produced the tail of the answer; persisted.
            let mut generated_at = temperature;
            let preview = prompt_preview(&context.prompt);

            let request = GenerationRequest {
                prompt: context.prompt.clone(),
                history: context.history.clone(),
                temperature,
            };

            state = transition(id, state, SessionState::Streaming);
            tracing::info!(
                session = %id,
                client = %context.client_key,
                temperature,
                prompt = %preview,
                "Starting generation"
            );

            let primary: Result<(), AgentError> = match agent.stream(&request).await {
                Ok(mut handle) => {
                    let mut failure = None;
                    while let Some(item) = handle.next().await {
                        match item {
                            Ok(AgentChunk::Text(text)) => {
                                response.push_str(&text);
                                yield StreamEvent::Fragment(text);
                            },
                            Ok(AgentChunk::Usage(total)) => reported_usage = Some(total),
                            Err(e) => {
                                failure = Some(e);
                                break;
                            },
                        }
                    }
                    match failure {
                        Some(e) => Err(e),
                        None if response.is_empty() => Err(AgentError::EmptyResponse),
                        None => Ok(()),
                    }
                },
                Err(e) => Err(e),
            };

            if let Err(e) = primary {
                state = transition(id, state, SessionState::FallingBack);
                tracing::warn!(
                    session = %id,
                    error = %e,
                    delivered_chars = response.chars().count(),
                    "Streaming generation failed, falling back to single-shot call"
                );

                let fallback_request = GenerationRequest {
                    temperature: config.fallback_temperature.unwrap_or(temperature),
                    ..request
                };
                generated_at = fallback_request.temperature;

                match agent.complete(&fallback_request).await {
                    Ok(completion) => {
                        // Usage reported for the fallback call alone no longer covers
                        // text delivered before the failure.
                        reported_usage = if response.is_empty() { completion.usage } else { None };

                        let delay = Duration::from_millis(stream_config.fallback_chunk_delay_ms);
                        for (i, piece) in
                            chunk_chars(&completion.text, stream_config.fallback_chunk_chars)
                                .into_iter()
                                .enumerate()
                        {
                            if i > 0 && !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            response.push_str(&piece);
                            yield StreamEvent::Fragment(piece);
                        }
                    },
                    Err(e2) => {
                        let failure = ChatError::UpstreamGeneration {
                            message: format!("stream: {}; fallback: {}", e, e2),
                        };
                        tracing::error!(
                            session = %id,
                            error = %failure,
                            prompt = %preview,
                            "Generation failed on both paths"
                        );
                        let _ = transition(id, state, SessionState::Done);
                        yield StreamEvent::Error(failure.client_message());
                        return;
                    },
                }
            }

            state = transition(id, state, SessionState::Completing);

            let token_usage = match reported_usage {
                Some(total) => TokenUsage::reported(total),
                None => TokenUsage::estimate(&response),
            };

            let interaction_id = recorder
                .record(NewInteraction {
                    user_prompt: context.prompt.clone(),
                    model: agent.model_id().to_string(),
                    temperature: generated_at,
                    message: response.clone(),
                    token_usage: token_usage.total,
                })
                .await;

            let message_history = config.history_enabled.then(|| {
                updated_history(
                    &context.history,
                    &context.prompt,
                    &response,
                    config.max_history_messages,
                )
            });

            let _ = transition(id, state, SessionState::Done);
            tracing::info!(
                session = %id,
                interaction_id = %interaction_id,
                tokens = token_usage.total,
                estimated = token_usage.is_estimated(),
                "Generation completed"
            );

            yield StreamEvent::Completion(CompletionMeta {
                token_usage,
                temperature,
                interaction_id,
                message_history,
            });
        }
    }
}

fn transition(session: Uuid, from: SessionState, to: SessionState) -> SessionState {
    tracing::debug!(session = %session, ?from, ?to, "session transition");
    to
}

/// Split `text` into pieces of at most `size` characters.
pub fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}
