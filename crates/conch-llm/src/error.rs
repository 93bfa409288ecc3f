#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Ollama request failed: {0}")]
    Ollama(String),

    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
