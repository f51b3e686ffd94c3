use byblia_types::models::config::SessionConfig;
use byblia_types::{ChatError, ChatMessage, ChatRequest, MessageRole};

/// Validated inputs of one chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub client_key: String,
    /// Trimmed prompt
    pub prompt: String,
    /// Accepted prior context, oldest first
    pub history: Vec<ChatMessage>,
}

impl RequestContext {
    /// Validate a request body.
    ///
    /// The prompt must be non-empty after trimming and at most
    /// `max_prompt_chars` characters. Prior context is kept only when history
    /// is enabled; client-supplied system messages and blank entries are
    /// dropped, and only the newest `max_history_messages` survive.
    pub fn from_request(
        client_key: impl Into<String>,
        request: ChatRequest,
        config: &SessionConfig,
    ) -> Result<Self, ChatError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(ChatError::validation("Prompt cannot be empty"));
        }

        let prompt_chars = prompt.chars().count();
        if prompt_chars > config.max_prompt_chars {
            return Err(ChatError::validation(format!(
                "Prompt is too long ({} characters, maximum {})",
                prompt_chars, config.max_prompt_chars
            )));
        }

        let history = match request.message_history {
            Some(messages) if config.history_enabled => {
                let mut accepted: Vec<ChatMessage> = messages
                    .into_iter()
                    .filter(|m| m.role != MessageRole::System && !m.content.trim().is_empty())
                    .collect();
                let excess = accepted.len().saturating_sub(config.max_history_messages);
                accepted.drain(..excess);
                accepted
            },
            _ => Vec::new(),
        };

        Ok(Self { client_key: client_key.into(), prompt: prompt.to_string(), history })
    }
}

/// Conversation after this exchange, bounded to the newest `max_messages`.
pub fn updated_history(
    prior: &[ChatMessage],
    prompt: &str,
    response: &str,
    max_messages: usize,
) -> Vec<ChatMessage> {
    let mut history: Vec<ChatMessage> = prior.to_vec();
    history.push(ChatMessage::user(prompt));
    history.push(ChatMessage::assistant(response));
    let excess = history.len().saturating_sub(max_messages);
    history.drain(..excess);
    history
}
