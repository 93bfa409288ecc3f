#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] conch_llm::LlmError),

    #[error(transparent)]
    Channel(#[from] crate::channel::ChannelError),

    #[error("model call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}
