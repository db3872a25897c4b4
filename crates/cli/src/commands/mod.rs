//! CLI subcommands and the plumbing they share.

pub mod chat;
pub mod doctor;
pub mod init;
pub mod run;
pub mod tools;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use minicursor_agent::{AgentLoop, RunReport};
use minicursor_config::AppConfig;
use minicursor_core::error::Error;
use minicursor_core::event::{DomainEvent, EventBus};
use minicursor_core::tool::ToolRegistry;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Everything needed to answer queries.
pub struct Session {
    pub agent: AgentLoop,
    pub config: AppConfig,
}

/// Load config and wire the model client, tools and agent loop together.
pub fn build_session() -> Result<Session, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export MINICURSOR_API_KEY='sk-...'");
        eprintln!("    export OPENAI_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = minicursor_providers::build_from_config(&config)?;
    let tools = build_tools(&config)?;
    let event_bus = Arc::new(EventBus::default());
    spawn_progress(&event_bus);

    let mut agent = AgentLoop::new(
        provider,
        &config.model,
        config.temperature,
        tools,
        event_bus,
    )
    .with_parallel_tool_calls(config.agent.parallel_tool_calls);
    if let Some(max_tokens) = config.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }
    if config.agent.tool_timeout_secs > 0 {
        agent = agent.with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs));
    }

    Ok(Session { agent, config })
}

/// The built-in tools, configured for this session.
fn build_tools(config: &AppConfig) -> Result<Arc<ToolRegistry>, Error> {
    let registry = minicursor_tools::default_registry(&config.tools).map_err(Error::from)?;
    Ok(Arc::new(registry))
}

/// The system prompt used when neither the command line nor the config
/// provides one.
pub fn default_system_prompt(cwd: &Path) -> String {
    format!(
        "You are a project assistant that completes tasks with tools.\n\
         Current working directory: {}\n\
         \n\
         Tools:\n\
         1. read_file: read a file\n\
         2. write_file: write a file\n\
         3. execute_command: run a command (supports workingDirectory)\n\
         4. list_directory: list a directory\n\
         5. query_user: look up a user record\n\
         \n\
         Rules for execute_command:\n\
         - workingDirectory switches to that directory before running\n\
         - when you pass workingDirectory, do not also cd into it in the command\n\
         - wrong: {{ command: \"cd app && pnpm install\", workingDirectory: \"app\" }}\n\
         - right: {{ command: \"pnpm install\", workingDirectory: \"app\" }}\n\
         \n\
         Keep replies short; say only what you did.",
        cwd.display()
    )
}

/// Pick the system preamble: command line, then config, then the default.
pub fn system_preamble(cli: Option<String>, config: &AppConfig) -> String {
    cli.or_else(|| config.agent.system_prompt.clone())
        .unwrap_or_else(|| default_system_prompt(&std::env::current_dir().unwrap_or_default()))
}

/// Run one query; Ctrl-C or the deadline cancels it.
pub async fn run_query(
    agent: &AgentLoop,
    query: &str,
    preamble: &str,
    max_iterations: u32,
    timeout: Option<Duration>,
) -> Result<RunReport, Error> {
    let cancel = CancellationToken::new();

    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n  Cancelling...");
                cancel.cancel();
            }
        })
    };
    let deadline = timeout.map(|limit| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            cancel.cancel();
        })
    });

    let started = Instant::now();
    let result = agent
        .run_cancellable(query, Some(preamble), max_iterations, &cancel)
        .await;

    ctrl_c.abort();
    if let Some(deadline) = deadline {
        deadline.abort();
    }

    if let (Err(Error::Cancelled), Some(limit)) = (&result, timeout)
        && started.elapsed() >= limit
    {
        eprintln!("  Gave up after {}s.", limit.as_secs());
    }
    result
}

/// Render domain events as progress lines on stderr.
fn spawn_progress(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            match event.as_ref() {
                DomainEvent::RoundStarted { iteration, .. } => {
                    eprintln!("  ⏳ Waiting for the model (round {iteration})...");
                }
                DomainEvent::ResponseGenerated { tool_calls, .. } if *tool_calls > 0 => {
                    eprintln!("  🔧 {tool_calls} tool call(s) requested");
                }
                DomainEvent::ToolExecuted {
                    tool_name,
                    success,
                    duration_ms,
                    ..
                } => {
                    let mark = if *success { "✅" } else { "❌" };
                    eprintln!("     {mark} {tool_name} ({duration_ms} ms)");
                }
                _ => {}
            }
        }
    });
}
