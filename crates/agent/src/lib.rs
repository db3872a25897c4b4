//! The agent loop: model turns, tool calls, and back again.
//!
//! A query is answered in rounds:
//!
//! 1. **Seed** a fresh transcript (optional system preamble + user query)
//! 2. **Invoke the model** with the whole transcript and the tool definitions
//! 3. **If tool calls**: resolve every call, append the results in request
//!    order, loop back to step 2
//! 4. **If text only**: that text is the final answer
//!
//! The loop stops with [`LoopOutcome::Exhausted`] once the iteration bound is
//! reached while the model is still requesting tools.

pub mod invoker;
pub mod loop_runner;

#[cfg(test)]
pub(crate) mod testing;

pub use invoker::ToolInvoker;
pub use loop_runner::{AgentLoop, DEFAULT_MAX_ITERATIONS, LoopOutcome, RunReport};
