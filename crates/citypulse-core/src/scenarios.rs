//! Scenario batch runner
//!
//! Lists, creates, runs and deletes agent test scenarios. Outcomes are
//! classified by the remote executor; this module aggregates them into a
//! [`ScenarioBoard`] and tallies batch summaries. After any run, successful
//! or not, the scenario list is reloaded so `last_run_outcome` is never
//! stale.

mod draft;
mod runner;

pub use citypulse_remote::{
    evaluate, AgentReply, BatchResult, BatchSummary, Evaluation, Expectation,
    ExpectationPredicate, ScenarioOutcome, ScenarioRecord, ScenarioResult,
};
pub use draft::{Confirmation, ScenarioDraft};
pub use runner::{ScenarioBoard, ScenarioRunner};

#[cfg(test)]
mod tests;
