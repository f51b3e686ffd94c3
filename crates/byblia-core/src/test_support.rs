//! In-process doubles for the model agent and the store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use byblia_types::{FeedbackOutcome, InteractionRecord, NewInteraction};

use crate::agent::{
    AgentChunk, AgentCompletion, AgentError, GenerationHandle, GenerationRequest, ModelAgent,
};
use crate::store::{InteractionStore, StoreError, StoreResult};

/// Scripted outcome of one `stream` call.
#[derive(Debug, Clone)]
pub enum StreamScript {
    /// Emit these chunks, then end normally
    Chunks(Vec<AgentChunk>),
    /// Emit these chunks, then fail
    FailAfter(Vec<AgentChunk>),
    /// Fail before returning a handle
    Refuse,
    /// Emit these chunks, then never finish
    Hang(Vec<AgentChunk>),
}

/// Agent that replays scripted responses and counts calls.
pub struct ScriptedAgent {
    streams: Mutex<VecDeque<StreamScript>>,
    completions: Mutex<VecDeque<Result<AgentCompletion, String>>>,
    pub stream_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(VecDeque::new()),
            completions: Mutex::new(VecDeque::new()),
            stream_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_stream(self, script: StreamScript) -> Self {
        self.streams.lock().push_back(script);
        self
    }

    pub fn with_completion(self, text: &str, usage: Option<u32>) -> Self {
        self.completions.lock().push_back(Ok(AgentCompletion { text: text.to_string(), usage }));
        self
    }

    pub fn with_failed_completion(self) -> Self {
        self.completions.lock().push_back(Err("completion refused".to_string()));
        self
    }

    pub fn text_chunks(parts: &[&str]) -> Vec<AgentChunk> {
        parts.iter().map(|p| AgentChunk::Text((*p).to_string())).collect()
    }

    pub fn total_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst) + self.complete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelAgent for ScriptedAgent {
    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn stream(&self, request: &GenerationRequest) -> Result<GenerationHandle, AgentError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let script = self.streams.lock().pop_front().unwrap_or(StreamScript::Refuse);
        let items: Vec<Result<AgentChunk, AgentError>> = match script {
            StreamScript::Refuse => {
                return Err(AgentError::Status { status: 503, body: "overloaded".to_string() })
            },
            StreamScript::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            StreamScript::FailAfter(chunks) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(AgentError::Upstream("connection reset".to_string()))))
                .collect(),
            StreamScript::Hang(chunks) => {
                let head = futures::stream::iter(chunks.into_iter().map(Ok));
                return Ok(Box::pin(futures::StreamExt::chain(head, futures::stream::pending())));
            },
        };
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<AgentCompletion, AgentError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.completions.lock().pop_front() {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(body)) => Err(AgentError::Status { status: 500, body }),
            None => Err(AgentError::EmptyResponse),
        }
    }
}

/// Store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl InteractionStore for FailingStore {
    async fn count(&self) -> StoreResult<i64> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn insert(&self, _: &NewInteraction, _: i32) -> StoreResult<i64> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn set_feedback(&self, _: i64, _: bool) -> StoreResult<FeedbackOutcome> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn recent(&self, _: i64) -> StoreResult<Vec<InteractionRecord>> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Store that takes `delay` before answering each call.
pub struct SlowStore {
    pub delay: Duration,
    pub inner: crate::store::MemoryInteractionStore,
}

#[async_trait]
impl InteractionStore for SlowStore {
    async fn count(&self) -> StoreResult<i64> {
        tokio::time::sleep(self.delay).await;
        self.inner.count().await
    }

    async fn insert(&self, interaction: &NewInteraction, number: i32) -> StoreResult<i64> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(interaction, number).await
    }

    async fn set_feedback(&self, id: i64, feedback: bool) -> StoreResult<FeedbackOutcome> {
        self.inner.set_feedback(id, feedback).await
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<InteractionRecord>> {
        self.inner.recent(limit).await
    }

    fn backend(&self) -> &'static str {
        "slow"
    }
}
