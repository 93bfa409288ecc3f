//! Tool registry, command safety rules, command extraction and the shell runner.

pub mod command;
pub mod config;
pub mod executor;
#[cfg(feature = "mock")]
pub mod mock;
pub mod registry;
pub mod safety;
pub mod shell;
pub mod system_info;
pub mod web_search;

pub use command::{CommandCandidate, extract_commands};
pub use config::{ShellConfig, ToolsConfig, WebSearchConfig};
pub use executor::{Tool, ToolError};
pub use registry::{AnyTool, ToolDef, ToolRegistry};
pub use safety::{DenyRule, is_safe};
pub use shell::{
    ExecutionObserver, ExecutionOutcome, ExecutionResult, ShellRunner, format_report,
};
pub use system_info::SystemInfoTool;
pub use web_search::WebSearchTool;
