use serde::Deserialize;

/// Top-level configuration for the tool layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

#[cfg(windows)]
fn default_shell_program() -> String {
    "cmd".into()
}

#[cfg(not(windows))]
fn default_shell_program() -> String {
    "sh".into()
}

#[cfg(windows)]
fn default_shell_args() -> Vec<String> {
    vec!["/C".into()]
}

#[cfg(not(windows))]
fn default_shell_args() -> Vec<String> {
    vec!["-c".into()]
}

/// Interpreter used to run approved commands: `<program> <args...> <command>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell_program")]
    pub program: String,
    #[serde(default = "default_shell_args")]
    pub args: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell_program(),
            args: default_shell_args(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://www.google.com/search".into()
}

fn default_result_selector() -> String {
    "div.g a".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".into()
}

fn default_search_timeout() -> u64 {
    15
}

fn default_max_body_bytes() -> usize {
    1_048_576
}

/// Configuration for the optional `search_web` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    /// CSS selector matching result links on the search page.
    #[serde(default = "default_result_selector")]
    pub result_selector: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_search_endpoint(),
            result_selector: default_result_selector(),
            user_agent: default_user_agent(),
            timeout: default_search_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
