use ollama_rs::Ollama;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::{ChatMessage, MessageRole};
use ollama_rs::generation::tools::{
    ToolCall as OllamaToolCall, ToolCallFunction, ToolFunctionInfo, ToolInfo, ToolType,
};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role, ToolCall, ToolDefinition};

const DEFAULT_PORT: u16 = 11434;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
}

impl OllamaProvider {
    #[must_use]
    pub fn new(base_url: &str, model: String) -> Self {
        let (host, port) = parse_host_port(base_url);
        Self {
            client: Ollama::new(host, port),
            model,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check if Ollama is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection to Ollama fails.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        let models = self.client.list_local_models().await.map_err(|e| {
            LlmError::Ollama(format!("failed to connect to Ollama, is it running? {e}"))
        })?;
        if !models.iter().any(|m| model_matches(&m.name, &self.model)) {
            tracing::warn!(model = %self.model, "model not found among local Ollama models");
        }
        Ok(())
    }
}

impl LlmProvider for OllamaProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, LlmError> {
        let ollama_messages: Vec<ChatMessage> = messages.iter().map(convert_message).collect();
        let ollama_tools = tools
            .iter()
            .map(convert_tool)
            .collect::<Result<Vec<_>, _>>()?;

        let request =
            ChatMessageRequest::new(self.model.clone(), ollama_messages).tools(ollama_tools);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| LlmError::Ollama(format!("chat request failed: {e}")))?;

        Ok(convert_response(response.message))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ollama"
    }
}

fn convert_role(role: Role) -> MessageRole {
    match role {
        Role::System => MessageRole::System,
        Role::User => MessageRole::User,
        Role::Assistant => MessageRole::Assistant,
        Role::Tool => MessageRole::Tool,
    }
}

fn convert_message(msg: &Message) -> ChatMessage {
    let mut chat_msg = ChatMessage::new(convert_role(msg.role), msg.content.clone());
    chat_msg.tool_calls = msg
        .tool_calls
        .iter()
        .map(|call| OllamaToolCall {
            function: ToolCallFunction {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        })
        .collect();
    chat_msg
}

fn convert_tool(def: &ToolDefinition) -> Result<ToolInfo, LlmError> {
    Ok(ToolInfo {
        tool_type: ToolType::Function,
        function: ToolFunctionInfo {
            name: def.name.clone(),
            description: def.description.clone(),
            parameters: serde_json::from_value(def.parameters.clone())?,
        },
    })
}

fn convert_response(msg: ChatMessage) -> Message {
    let tool_calls = msg
        .tool_calls
        .into_iter()
        .map(|call| ToolCall {
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();
    Message::assistant(msg.content).with_tool_calls(tool_calls)
}

/// Ollama reports `llama3.2:latest` for a model requested as `llama3.2`.
fn model_matches(local: &str, requested: &str) -> bool {
    local == requested
        || (!requested.contains(':') && local.strip_suffix(":latest") == Some(requested))
}

fn parse_host_port(url: &str) -> (String, u16) {
    let url = url.trim_end_matches('/');
    if let Some(colon_pos) = url.rfind(':') {
        let port_str = &url[colon_pos + 1..];
        if let Ok(port) = port_str.parse::<u16>() {
            let host = url[..colon_pos].to_string();
            return (host, port);
        }
    }
    (url.to_string(), DEFAULT_PORT)
}
