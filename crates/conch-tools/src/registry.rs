use tracing::Instrument;

use crate::executor::{Tool, ToolError};
#[cfg(feature = "mock")]
use crate::mock::MockTool;
use crate::system_info::SystemInfoTool;
use crate::web_search::WebSearchTool;

/// Name, description and argument schema of a tool, as advertised to the model.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub id: &'static str,
    pub description: &'static str,
    pub schema: schemars::Schema,
}

/// Generates a match over all `AnyTool` variants, binding the inner tool
/// and evaluating the given expression for each arm.
macro_rules! delegate_tool {
    ($self:expr, |$t:ident| $expr:expr) => {
        match $self {
            AnyTool::SystemInfo($t) => $expr,
            AnyTool::WebSearch($t) => $expr,
            #[cfg(feature = "mock")]
            AnyTool::Mock($t) => $expr,
        }
    };
}

/// Closed set of tools the registry can dispatch to.
#[derive(Debug)]
pub enum AnyTool {
    SystemInfo(SystemInfoTool),
    WebSearch(WebSearchTool),
    #[cfg(feature = "mock")]
    Mock(MockTool),
}

impl Tool for AnyTool {
    fn definition(&self) -> ToolDef {
        delegate_tool!(self, |t| t.definition())
    }

    async fn invoke(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        delegate_tool!(self, |t| t.invoke(args).await)
    }
}

impl From<SystemInfoTool> for AnyTool {
    fn from(tool: SystemInfoTool) -> Self {
        Self::SystemInfo(tool)
    }
}

impl From<WebSearchTool> for AnyTool {
    fn from(tool: WebSearchTool) -> Self {
        Self::WebSearch(tool)
    }
}

#[cfg(feature = "mock")]
impl From<MockTool> for AnyTool {
    fn from(tool: MockTool) -> Self {
        Self::Mock(tool)
    }
}

/// Fixed, name-unique set of tools for the lifetime of the process.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<AnyTool>,
    defs: Vec<ToolDef>,
}

impl ToolRegistry {
    /// # Errors
    ///
    /// Returns `ToolError::DuplicateName` if two tools share the same id.
    pub fn new(tools: Vec<AnyTool>) -> Result<Self, ToolError> {
        let defs: Vec<ToolDef> = tools.iter().map(Tool::definition).collect();
        for (i, def) in defs.iter().enumerate() {
            if defs[..i].iter().any(|d| d.id == def.id) {
                return Err(ToolError::DuplicateName {
                    name: def.id.to_owned(),
                });
            }
        }
        Ok(Self { tools, defs })
    }

    /// Tool definitions in registration order.
    #[must_use]
    pub fn list(&self) -> &[ToolDef] {
        &self.defs
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.defs.iter().map(|d| d.id).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a tool by exact (case-sensitive) id after trimming `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&AnyTool> {
        let name = name.trim();
        self.defs
            .iter()
            .position(|d| d.id == name)
            .map(|i| &self.tools[i])
    }

    /// Invoke the tool registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::NotFound` for an unknown name, or whatever error the tool raised.
    pub async fn invoke(&self, name: &str, args: &serde_json::Value) -> Result<String, ToolError> {
        let Some(tool) = self.find(name) else {
            return Err(ToolError::NotFound {
                name: name.to_owned(),
            });
        };
        let span = tracing::info_span!("tool_call", tool = name.trim());
        async {
            tracing::info!(%args, "invoking tool");
            tool.invoke(args).await
        }
        .instrument(span)
        .await
    }
}
