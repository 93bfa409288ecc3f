mod error;
mod prompt;
mod selection;
mod tool_execution;

use std::time::Duration;

use conch_llm::{LlmProvider, Message, ToolCall, ToolDefinition};
use conch_tools::{
    ExecutionObserver, ExecutionResult, ShellRunner, ToolRegistry, extract_commands, format_report,
};
use tracing::Instrument;

pub use error::AgentError;
pub use prompt::build_system_prompt;
pub use selection::{BlockedCommand, CancelReason, Proposal, Selection, select};

use crate::channel::{AgentEvent, Channel, ChannelError};
use tool_execution::tool_def_to_definition;

pub const TASK_PROMPT: &str = "Please enter the task you want to perform:";

pub const SELECTION_PROMPT: &str = "Please enter the numbers of the commands you want to execute \
separated by spaces, \"y\" or \"a\" to run all, or press Enter to cancel:";

/// How a task ended when no fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The model replied without any command block.
    Finished,
    Cancelled(CancelReason),
}

#[derive(Debug)]
enum AgentState {
    AwaitingModel,
    HandlingToolCalls(Vec<ToolCall>),
    ExtractingCommands(String),
    AwaitingUserSelection(Proposal),
    Executing(Vec<String>),
    Finished,
    Cancelled(CancelReason),
}

impl AgentState {
    fn name(&self) -> &'static str {
        match self {
            Self::AwaitingModel => "awaiting_model",
            Self::HandlingToolCalls(_) => "handling_tool_calls",
            Self::ExtractingCommands(_) => "extracting_commands",
            Self::AwaitingUserSelection(_) => "awaiting_user_selection",
            Self::Executing(_) => "executing",
            Self::Finished => "finished",
            Self::Cancelled(_) => "cancelled",
        }
    }
}

/// Drives one task: model calls, tool calls, command proposals and execution.
///
/// The transcript is owned here and only ever appended to.
pub struct Agent<P: LlmProvider, C: Channel> {
    provider: P,
    channel: C,
    registry: ToolRegistry,
    runner: ShellRunner,
    tool_defs: Vec<ToolDefinition>,
    messages: Vec<Message>,
    llm_timeout: Option<Duration>,
}

impl<P: LlmProvider, C: Channel> Agent<P, C> {
    #[must_use]
    pub fn new(provider: P, channel: C, registry: ToolRegistry, runner: ShellRunner) -> Self {
        let tool_defs = registry.list().iter().map(tool_def_to_definition).collect();
        Self {
            provider,
            channel,
            registry,
            runner,
            tool_defs,
            messages: Vec::new(),
            llm_timeout: None,
        }
    }

    /// Bound every model call; exceeding it fails the task with `AgentError::Timeout`.
    #[must_use]
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Run `task` until the model stops proposing commands or the user cancels.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or times out, or the channel fails.
    /// Tool and command failures are fed back to the model instead.
    pub async fn run(&mut self, task: &str) -> Result<TaskOutcome, AgentError> {
        let names = self.registry.names();
        self.messages = vec![
            Message::system(build_system_prompt(&names)),
            Message::user(task),
        ];

        let mut state = AgentState::AwaitingModel;
        loop {
            tracing::debug!(state = state.name(), "agent state");
            state = match state {
                AgentState::AwaitingModel => self.await_model().await?,
                AgentState::HandlingToolCalls(calls) => {
                    self.handle_tool_calls(&calls).await?;
                    AgentState::AwaitingModel
                }
                AgentState::ExtractingCommands(text) => {
                    let candidates = extract_commands(&text);
                    if candidates.is_empty() {
                        AgentState::Finished
                    } else {
                        AgentState::AwaitingUserSelection(Proposal::classify(candidates))
                    }
                }
                AgentState::AwaitingUserSelection(proposal) => {
                    self.await_selection(&proposal).await?
                }
                AgentState::Executing(commands) => {
                    self.execute(&commands).await?;
                    AgentState::AwaitingModel
                }
                AgentState::Finished => {
                    self.channel.notify(AgentEvent::Finished).await?;
                    return Ok(TaskOutcome::Finished);
                }
                AgentState::Cancelled(reason) => {
                    self.channel
                        .notify(AgentEvent::Cancelled { reason })
                        .await?;
                    return Ok(TaskOutcome::Cancelled(reason));
                }
            };
        }
    }

    async fn await_model(&mut self) -> Result<AgentState, AgentError> {
        let reply = self.call_model().await?;
        self.messages.push(reply.clone());

        let internal = reply.has_tool_calls();
        self.channel
            .notify(AgentEvent::Assistant {
                text: &reply.content,
                internal,
            })
            .await?;

        if internal {
            Ok(AgentState::HandlingToolCalls(reply.tool_calls))
        } else {
            Ok(AgentState::ExtractingCommands(reply.content))
        }
    }

    async fn call_model(&self) -> Result<Message, AgentError> {
        tracing::debug!(
            provider = self.provider.name(),
            messages = self.messages.len(),
            tools = self.tool_defs.len(),
            "calling model"
        );
        let span = tracing::info_span!("llm_call", provider = self.provider.name());
        let chat = self
            .provider
            .chat(&self.messages, &self.tool_defs)
            .instrument(span);

        let Some(limit) = self.llm_timeout else {
            return Ok(chat.await?);
        };
        match tokio::time::timeout(limit, chat).await {
            Ok(reply) => Ok(reply?),
            Err(_) => Err(AgentError::Timeout {
                timeout_secs: limit.as_secs(),
            }),
        }
    }

    async fn await_selection(&mut self, proposal: &Proposal) -> Result<AgentState, AgentError> {
        self.channel
            .notify(AgentEvent::Proposals {
                safe: &proposal.safe,
                blocked: &proposal.blocked,
            })
            .await?;

        let input = self
            .channel
            .read_line(SELECTION_PROMPT)
            .await?
            .unwrap_or_default();

        Ok(match select(&input, &proposal.safe) {
            Selection::Run(commands) => AgentState::Executing(commands),
            Selection::Cancelled(reason) => AgentState::Cancelled(reason),
        })
    }

    async fn execute(&mut self, commands: &[String]) -> Result<(), AgentError> {
        let mut observer = ChannelObserver(&mut self.channel);
        let results = self.runner.run_observed(commands, &mut observer).await?;
        self.messages.push(Message::system(format_report(&results)));
        Ok(())
    }
}

/// Announces each command on the channel before it runs and its result after.
struct ChannelObserver<'a, C>(&'a mut C);

impl<C: Channel> ExecutionObserver for ChannelObserver<'_, C> {
    type Error = ChannelError;

    async fn before(&mut self, command: &str) -> Result<(), ChannelError> {
        self.0.notify(AgentEvent::Executing { command }).await
    }

    async fn after(&mut self, result: &ExecutionResult) -> Result<(), ChannelError> {
        self.0.notify(AgentEvent::Executed { result }).await
    }
}
