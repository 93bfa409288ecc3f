//! Transcript types and LLM provider backends.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use error::LlmError;
pub use provider::{LlmProvider, Message, Role, ToolCall, ToolDefinition};
