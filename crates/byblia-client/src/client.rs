use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use byblia_types::{ChatMessage, ChatRequest, FeedbackRequest};

use crate::error::ClientError;
use crate::sse::{SseBuffer, SseRecord};
use crate::types::*;

/// Events of one `/chat` call, ending after the terminal event.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<ChatEvent, ClientError>> + Send>>;

pub struct BybliaClient {
    client: Client,
    config: ClientConfig,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl BybliaClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, config })
    }

    /// Connect to the first candidate answering `/health`.
    ///
    /// `origin` is sent as the `Origin` header on every later request.
    pub async fn discover(
        candidates: &[String],
        origin: Option<String>,
    ) -> Result<Self, ClientError> {
        for base_url in candidates {
            if let Ok(client) = Self::try_connect(base_url, origin.clone()).await {
                tracing::info!("Connected to Byblia at {}", base_url);
                return Ok(client);
            }
        }
        Err(ClientError::ServerNotFound)
    }

    async fn try_connect(base_url: &str, origin: Option<String>) -> Result<Self, ClientError> {
        let config = ClientConfig { base_url: base_url.to_string(), origin, ..Default::default() };
        let client = Self::new(config)?;
        let resp = client
            .client
            .get(client.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        if resp.status().is_success() {
            Ok(client)
        } else {
            Err(ClientError::Connection(format!("Health check failed: {}", resp.status())))
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn with_origin(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.origin {
            Some(origin) => builder.header(reqwest::header::ORIGIN, origin),
            None => builder,
        }
    }

    /// Ask a question and stream the answer.
    ///
    /// 5xx answers before the stream starts are retried with backoff; 429
    /// surfaces immediately as [`ClientError::RateLimited`].
    pub async fn chat_stream(
        &self,
        prompt: &str,
        history: Option<Vec<ChatMessage>>,
    ) -> Result<ChatEventStream, ClientError> {
        let request = ChatRequest { prompt: prompt.to_string(), message_history: history };
        let resp = self.open_with_retry(&request).await?;
        let mut bytes = resp.bytes_stream();

        Ok(Box::pin(stream! {
            let mut buffer = SseBuffer::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ClientError::Stream(e.to_string()));
                        return;
                    },
                };
                let records = match buffer.push(&chunk) {
                    Ok(records) => records,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                for record in records {
                    match record {
                        SseRecord::Done => return,
                        SseRecord::Event(event) => yield Ok(event),
                    }
                }
            }

            if buffer.has_pending() {
                yield Err(ClientError::Stream("stream ended mid-frame".to_string()));
            }
        }))
    }

    async fn open_with_retry(&self, request: &ChatRequest) -> Result<Response, ClientError> {
        let mut attempts = 0;
        let mut delay = self.config.retry.base_delay_ms;

        loop {
            attempts += 1;
            let sent = self.with_origin(self.client.post(self.url("/chat"))).json(request).send().await?;
            match check_status(sent).await {
                Ok(resp) => return Ok(resp),
                Err(ClientError::ServerError { status, .. }) if status >= 500 => {
                    if attempts > self.config.retry.max_retries {
                        return Err(ClientError::Timeout(attempts));
                    }
                    tracing::debug!("Server error {}, retrying (attempt {})", status, attempts);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(self.config.retry.max_delay_ms);
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Send thumbs up (`true`) or down (`false`) for an answered question.
    pub async fn send_feedback(
        &self,
        interaction_id: i64,
        feedback: bool,
    ) -> Result<FeedbackResponse, ClientError> {
        let resp = self
            .with_origin(self.client.post(self.url("/feedback")))
            .json(&FeedbackRequest { interaction_id, feedback })
            .send()
            .await?;

        check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Newest recorded interactions.
    pub async fn recent_interactions(
        &self,
        limit: u32,
    ) -> Result<Vec<InteractionRecord>, ClientError> {
        let resp = self
            .with_origin(self.client.get(self.url("/interactions")))
            .query(&[("limit", limit)])
            .send()
            .await?;

        check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        return Err(ClientError::RateLimited { retry_after });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).map_or(body, |b| b.detail);
        return Err(ClientError::ServerError { status: status.as_u16(), message });
    }

    Ok(resp)
}

/// `BYBLIA_URL`, then `PORT` on loopback, then the default port.
pub fn discovery_candidates() -> Vec<String> {
    let mut candidates = Vec::new();
    if let Ok(url) = std::env::var("BYBLIA_URL") {
        candidates.push(url);
    }
    if let Ok(port) = std::env::var("PORT") {
        candidates.push(format!("http://127.0.0.1:{}", port));
    }
    candidates.push("http://127.0.0.1:8000".to_string());
    candidates
}
