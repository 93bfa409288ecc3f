use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MODEL")
            && !v.trim().is_empty()
        {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("CONCH_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("CONCH_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("CONCH_LLM_TIMEOUT") {
            if let Ok(secs) = v.parse::<u64>() {
                self.llm.timeout_secs = Some(secs);
            } else {
                tracing::warn!("ignoring invalid CONCH_LLM_TIMEOUT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("CONCH_TOOLS_SHELL_PROGRAM") {
            self.tools.shell.program = v;
        }
        if let Ok(v) = std::env::var("CONCH_TOOLS_WEB_SEARCH_ENABLED") {
            if let Ok(enabled) = v.parse::<bool>() {
                self.tools.web_search.enabled = enabled;
            } else {
                tracing::warn!("ignoring invalid CONCH_TOOLS_WEB_SEARCH_ENABLED value: {v}");
            }
        }
    }
}
