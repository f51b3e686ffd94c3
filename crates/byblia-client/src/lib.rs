//! Async client for the Byblia chat service.
//!
//! ```no_run
//! # async fn demo() -> Result<(), byblia_client::ClientError> {
//! use byblia_client::{BybliaClient, ChatEvent, ClientConfig};
//! use futures::StreamExt;
//!
//! let client = BybliaClient::new(ClientConfig::default())?;
//! let mut events = client.chat_stream("Qual é o significado de João 3:16?", None).await?;
//! while let Some(event) = events.next().await {
//!     if let ChatEvent::Chunk(text) = event? {
//!         print!("{}", text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod sse;
mod types;

pub use client::{discovery_candidates, BybliaClient, ChatEventStream};
pub use error::ClientError;
pub use sse::{SseBuffer, SseRecord};
pub use types::*;
