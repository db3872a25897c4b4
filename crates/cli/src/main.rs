//! minicursor CLI — the main entry point.
//!
//! Commands:
//! - `run`     — Answer one query with the tool-using agent
//! - `chat`    — Interactive mode, one independent query per line
//! - `tools`   — List the built-in tools and their argument schemas
//! - `init`    — Write the default config file
//! - `doctor`  — Diagnose configuration and connectivity

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "minicursor",
    about = "minicursor — a tool-using coding agent for the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single query
    Run {
        /// The task for the agent
        query: String,

        /// Replace the default system prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Bound on model invocations (overrides config)
        #[arg(short = 'n', long)]
        max_iterations: Option<u32>,

        /// Give up after this many seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Print the full run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive mode; every line is an independent query
    Chat,

    /// List the built-in tools
    Tools,

    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            query,
            system,
            max_iterations,
            timeout,
            json,
        } => {
            commands::run::run(commands::run::RunArgs {
                query,
                system,
                max_iterations,
                timeout,
                json,
            })
            .await?
        }
        Commands::Chat => commands::chat::run().await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Init { force } => commands::init::run(force).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
