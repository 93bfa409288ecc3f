use conch_llm::{LlmProvider, Message, ToolCall, ToolDefinition};
use conch_tools::{ToolDef, ToolError};

use super::Agent;
use super::error::AgentError;
use crate::channel::{AgentEvent, Channel};

const TOOL_NOT_FOUND: &str = "No tool found with this name";

impl<P: LlmProvider, C: Channel> Agent<P, C> {
    /// Answer every requested call, in request order, with exactly one tool message.
    ///
    /// Tool failures are reported back to the model instead of aborting the task.
    pub(super) async fn handle_tool_calls(
        &mut self,
        calls: &[ToolCall],
    ) -> Result<(), AgentError> {
        for call in calls {
            let name = call.name.trim();
            match self.registry.invoke(name, &call.arguments).await {
                Ok(output) => {
                    self.channel
                        .notify(AgentEvent::ToolCalled {
                            name,
                            output: &output,
                        })
                        .await?;
                    self.messages.push(Message::tool(output));
                }
                Err(ToolError::NotFound { .. }) => {
                    tracing::warn!(tool = name, "model requested an unknown tool");
                    self.channel
                        .notify(AgentEvent::ToolCalled {
                            name,
                            output: TOOL_NOT_FOUND,
                        })
                        .await?;
                    self.messages.push(Message::tool(TOOL_NOT_FOUND));
                }
                Err(e) => {
                    tracing::warn!(tool = name, "tool call failed: {e}");
                    let message =
                        format!("An error has occurred while calling the tool {name}: {e}");
                    self.channel
                        .notify(AgentEvent::ToolFailed {
                            name,
                            message: &message,
                        })
                        .await?;
                    self.messages.push(Message::tool(message));
                }
            }
        }
        Ok(())
    }
}

pub(super) fn tool_def_to_definition(def: &ToolDef) -> ToolDefinition {
    let mut params = serde_json::to_value(&def.schema).unwrap_or_default();
    if let serde_json::Value::Object(ref mut map) = params {
        map.remove("$schema");
        map.remove("title");
    }
    ToolDefinition {
        name: def.id.to_owned(),
        description: def.description.to_owned(),
        parameters: params,
    }
}
