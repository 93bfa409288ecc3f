use conch_tools::ExecutionResult;

use crate::agent::{BlockedCommand, CancelReason};

/// Typed error for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input side went away while a blocking read was in flight.
    #[error("channel closed")]
    ChannelClosed,

    /// Catch-all for frontend-specific errors.
    #[error("{0}")]
    Other(String),
}

/// Something the agent wants the user to see.
#[derive(Debug, Clone, Copy)]
pub enum AgentEvent<'a> {
    /// Assistant text; `internal` when the same reply also requested tool calls.
    Assistant { text: &'a str, internal: bool },
    ToolCalled { name: &'a str, output: &'a str },
    ToolFailed { name: &'a str, message: &'a str },
    /// Commands extracted from the latest reply, split by the safety rules.
    Proposals {
        safe: &'a [String],
        blocked: &'a [BlockedCommand],
    },
    Executing { command: &'a str },
    Executed { result: &'a ExecutionResult },
    Finished,
    Cancelled { reason: CancelReason },
}

/// Interactive frontend the agent talks to.
pub trait Channel: Send {
    /// Show `prompt` and read one line. Returns `None` on EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn read_line(
        &mut self,
        prompt: &str,
    ) -> impl Future<Output = Result<Option<String>, ChannelError>> + Send;

    /// Render an agent event.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn notify(&mut self, event: AgentEvent<'_>)
    -> impl Future<Output = Result<(), ChannelError>> + Send;
}
