mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings the agent cannot start with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.llm.base_url.trim().is_empty() {
            bail!("llm.base_url must not be empty");
        }
        if self.tools.shell.program.trim().is_empty() {
            bail!("tools.shell.program must not be empty");
        }
        if self.llm.timeout_secs == Some(0) {
            bail!("llm.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
