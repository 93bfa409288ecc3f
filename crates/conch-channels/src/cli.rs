use std::io::{Write, stdout};

use conch_core::channel::{AgentEvent, Channel, ChannelError};

use crate::{input, render};

/// Channel that prompts on the terminal and prints events to stdout.
#[derive(Debug, Default)]
pub struct CliChannel;

impl CliChannel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be flushed.
    pub fn welcome(&self) -> Result<(), ChannelError> {
        println!("{}", render::welcome());
        stdout().flush()?;
        Ok(())
    }
}

/// Render an event, `None` for events with nothing to show.
fn render_event(event: AgentEvent<'_>) -> Option<String> {
    let text = match event {
        AgentEvent::Assistant { text, internal } => render::assistant(text, internal),
        AgentEvent::ToolCalled { name, output } => render::tool_called(name, output),
        AgentEvent::ToolFailed { message, .. } => render::tool_failed(message),
        AgentEvent::Proposals { safe, blocked } => {
            if safe.is_empty() && blocked.is_empty() {
                return None;
            }
            render::proposals(safe, blocked)
        }
        AgentEvent::Executing { command } => render::executing(command),
        AgentEvent::Executed { result } => render::executed(result),
        AgentEvent::Finished => render::finished(),
        AgentEvent::Cancelled { reason } => render::cancelled(reason),
    };
    Some(text)
}

impl Channel for CliChannel {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ChannelError> {
        let prompt = render::prompt(prompt);
        tokio::task::spawn_blocking(move || input::read_line(&prompt))
            .await
            .map_err(|e| ChannelError::Other(e.to_string()))?
            .map_err(ChannelError::Io)
    }

    async fn notify(&mut self, event: AgentEvent<'_>) -> Result<(), ChannelError> {
        if let Some(text) = render_event(event) {
            println!("{text}");
            stdout().flush()?;
        }
        Ok(())
    }
}
