//! `minicursor chat` — interactive mode.
//!
//! Every line is answered by a fresh run; nothing carries over between
//! queries.

use std::io::Write;
use std::time::Duration;

use minicursor_agent::LoopOutcome;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_session, run_query, system_preamble};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session()?;
    let config = &session.config;
    let preamble = system_preamble(None, config);
    let timeout = config.agent.run_timeout_secs.map(Duration::from_secs);
    let tools = session.agent.tools().names().join(", ");

    println!();
    println!("  minicursor — interactive mode");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Endpoint:  {}", config.api_base_url);
    println!("  Tools:     {tools}");
    println!();
    println!("  Each line is a separate task. Type 'exit' to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        match run_query(
            &session.agent,
            query,
            &preamble,
            config.agent.max_iterations,
            timeout,
        )
        .await
        {
            Ok(report) => {
                println!();
                if let LoopOutcome::Exhausted(_) = report.outcome {
                    println!("  (stopped at the iteration limit)");
                }
                for line in report.outcome.text().lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
