//! `minicursor run` — answer a single query.

use std::time::Duration;

use minicursor_agent::LoopOutcome;

use super::{build_session, run_query, system_preamble};

pub struct RunArgs {
    pub query: String,
    pub system: Option<String>,
    pub max_iterations: Option<u32>,
    pub timeout: Option<u64>,
    pub json: bool,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session()?;
    let config = &session.config;

    let preamble = system_preamble(args.system, config);
    let max_iterations = args.max_iterations.unwrap_or(config.agent.max_iterations);
    let timeout = args
        .timeout
        .or(config.agent.run_timeout_secs)
        .map(Duration::from_secs);

    let report = run_query(&session.agent, &args.query, &preamble, max_iterations, timeout).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.outcome {
        LoopOutcome::FinalAnswer(text) => {
            eprintln!(
                "  ✅ Done after {} model call(s), {} tool call(s)",
                report.model_calls, report.tool_calls
            );
            println!("{text}");
        }
        LoopOutcome::Exhausted(text) => {
            eprintln!("  ⚠️  Stopped after {max_iterations} rounds without a final answer.");
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }

    Ok(())
}
