use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use conch_channels::{CliChannel, render};
use conch_core::agent::{Agent, TASK_PROMPT, TaskOutcome};
use conch_core::channel::Channel;
use conch_core::config::Config;
use conch_llm::LlmProvider;
use conch_llm::ollama::OllamaProvider;
use conch_tools::{AnyTool, ShellRunner, SystemInfoTool, ToolRegistry, ToolsConfig, WebSearchTool};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Ask a local model to plan shell commands, then approve which ones run.
#[derive(Debug, Parser)]
#[command(name = "conch", version)]
struct Cli {
    /// Path to the TOML config file (also `CONCH_CONFIG`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ollama model to use, overriding config and environment
    #[arg(long)]
    model: Option<String>,

    /// Register the web search tool
    #[arg(long)]
    web_search: bool,

    /// Task to perform; prompted for when omitted
    task: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_subscriber();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            eprintln!("{}", render::fatal(&format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let provider = OllamaProvider::new(&config.llm.base_url, config.llm.model.clone());
    health_check(&provider).await;

    let registry = build_registry(&config.tools)?;
    let runner = ShellRunner::new(&config.tools.shell);
    let mut channel = CliChannel::new();
    channel.welcome()?;

    let task = if cli.task.is_empty() {
        channel.read_line(TASK_PROMPT).await?.unwrap_or_default()
    } else {
        cli.task.join(" ")
    };
    let task = task.trim();
    if task.is_empty() {
        tracing::info!("no task given, exiting");
        return Ok(());
    }

    let mut agent = Agent::new(provider, channel, registry, runner);
    if let Some(secs) = config.llm.timeout_secs {
        agent = agent.with_llm_timeout(Duration::from_secs(secs));
    }

    match agent.run(task).await.context("task failed")? {
        TaskOutcome::Finished => tracing::info!("task finished"),
        TaskOutcome::Cancelled(reason) => tracing::info!(?reason, "task cancelled"),
    }
    Ok(())
}

fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("CONCH_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.llm.model.clone_from(model);
    }
    if cli.web_search {
        config.tools.web_search.enabled = true;
    }
}

fn build_registry(tools: &ToolsConfig) -> anyhow::Result<ToolRegistry> {
    let mut all: Vec<AnyTool> = vec![SystemInfoTool::new().into()];
    if tools.web_search.enabled {
        all.push(WebSearchTool::new(&tools.web_search).into());
    }
    let registry = ToolRegistry::new(all).context("failed to build tool registry")?;
    tracing::info!(tools = ?registry.names(), "tools registered");
    Ok(registry)
}

async fn health_check(provider: &OllamaProvider) {
    match provider.health_check().await {
        Ok(()) => tracing::info!(provider = provider.name(), "health check passed"),
        Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
    }
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
