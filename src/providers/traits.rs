use async_trait::async_trait;

/// One role/content pair as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion backend.
///
/// Implementations send the full ordered conversation and return the
/// assistant's raw text. Connection failure, non-success status, and timeout
/// all surface as errors; no implementation retries.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Backend name, for logs and error messages.
    fn name(&self) -> &str;

    async fn chat_with_history(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> anyhow::Result<String>;
}
