//! Test-only scripted tool.

use std::sync::{Arc, Mutex};

use crate::executor::{Tool, ToolError};
use crate::registry::ToolDef;

#[derive(Debug, Clone)]
pub struct MockTool {
    id: &'static str,
    result: Result<String, String>,
    calls: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockTool {
    /// A tool that always returns `output`.
    #[must_use]
    pub fn returning(id: &'static str, output: impl Into<String>) -> Self {
        Self {
            id,
            result: Ok(output.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A tool whose every invocation fails with `message`.
    #[must_use]
    pub fn failing(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            result: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Arguments received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<serde_json::Value> {
        self.calls.lock().unwrap().clone()
    }
}

impl Tool for MockTool {
    fn definition(&self) -> ToolDef {
        ToolDef {
            id: self.id,
            description: "Scripted tool for tests",
            schema: schemars::json_schema!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn invoke(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(args.clone());
        self.result
            .clone()
            .map_err(|message| ToolError::Execution(std::io::Error::other(message)))
    }
}
