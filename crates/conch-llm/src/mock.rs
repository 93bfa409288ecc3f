//! Test-only mock LLM provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::provider::{LlmProvider, Message, ToolDefinition};

/// Replays scripted assistant replies in order and records what it was sent.
#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Message>>>,
    transcripts: Arc<Mutex<Vec<Vec<Message>>>>,
    pub default_response: String,
    pub fail_chat: bool,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            transcripts: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            fail_chat: false,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Self::default()
        }
    }

    /// Convenience for scripts made only of plain text replies.
    #[must_use]
    pub fn with_text_responses<S: Into<String>>(responses: Vec<S>) -> Self {
        Self::with_responses(responses.into_iter().map(Message::assistant).collect())
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of completed `chat` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    /// Transcript length observed by each `chat` call.
    #[must_use]
    pub fn transcript_lengths(&self) -> Vec<usize> {
        self.transcripts.lock().unwrap().iter().map(Vec::len).collect()
    }

    /// Full transcript sent on the `index`-th call.
    #[must_use]
    pub fn transcript(&self, index: usize) -> Option<Vec<Message>> {
        self.transcripts.lock().unwrap().get(index).cloned()
    }
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<Message, crate::LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        self.transcripts.lock().unwrap().push(messages.to_vec());
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| Message::assistant(self.default_response.clone())))
    }
}
