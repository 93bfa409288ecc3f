use crate::registry::ToolDef;

/// Errors that can occur while resolving or invoking a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("no tool found with name: {name}")]
    NotFound { name: String },

    #[error("duplicate tool name: {name}")]
    DuplicateName { name: String },

    #[error("invalid tool parameters: {message}")]
    InvalidParams { message: String },

    #[error("execution failed: {0}")]
    Execution(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Deserialize the model-supplied argument value into a typed parameter struct.
///
/// A missing argument object (`null`) is treated as `{}` so parameterless tools
/// and tools with defaulted fields accept it.
///
/// # Errors
///
/// Returns `ToolError::InvalidParams` when deserialization fails.
pub fn deserialize_params<T: serde::de::DeserializeOwned>(
    args: &serde_json::Value,
) -> Result<T, ToolError> {
    let value = if args.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        args.clone()
    };
    serde_json::from_value(value).map_err(|e| ToolError::InvalidParams {
        message: e.to_string(),
    })
}

/// A single named capability the model can call.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDef;

    /// Run the tool and return its textual result.
    fn invoke(
        &self,
        args: &serde_json::Value,
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}
