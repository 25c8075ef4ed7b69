//! CLI command: `citypulse scenarios`
//!
//! List, create, run and delete agent test scenarios.

use citypulse_core::scenarios::{BatchResult, ScenarioRecord, ScenarioResult};
use citypulse_core::{Confirmation, ScenarioDraft};
use clap::Subcommand;

use super::report;
use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum ScenarioCommands {
    /// List scenarios, most recently created first
    List,
    /// Run one scenario
    Run {
        /// Scenario identifier
        id: String,
        /// City to run against (defaults to the active city)
        #[arg(long)]
        city: Option<String>,
    },
    /// Run every scenario as a batch
    RunAll {
        /// City to run against (defaults to the active city)
        #[arg(long)]
        city: Option<String>,
    },
    /// Create a scenario
    Create {
        /// Scenario name
        #[arg(long)]
        name: String,
        /// Message sent to the agent
        #[arg(long)]
        input: String,
        /// Expected outcome: text to look for, or a JSON predicate
        #[arg(long)]
        expect: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// City the scenario is pinned to
        #[arg(long)]
        city: Option<String>,
    },
    /// Delete a scenario
    Delete {
        /// Scenario identifier
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Run a scenarios subcommand.
pub async fn run(app: &App, command: ScenarioCommands) -> anyhow::Result<()> {
    let runner = app.scenario_runner();

    match command {
        ScenarioCommands::List => {
            let scenarios = runner.list().await.map_err(report)?;
            print_list(&scenarios);
        }
        ScenarioCommands::Run { id, city } => {
            let result = runner.run_one(&id, city.as_deref()).await.map_err(report)?;
            print_result(&result);
        }
        ScenarioCommands::RunAll { city } => {
            let batch = runner.run_all(city.as_deref()).await.map_err(report)?;
            print_batch(&batch);
        }
        ScenarioCommands::Create {
            name,
            input,
            expect,
            description,
            city,
        } => {
            let draft = ScenarioDraft {
                name,
                description,
                input_message: input,
                city_id: city,
                expected_outcome: expect,
            };
            let created = runner.create(draft).await.map_err(report)?;
            println!("✓ Created scenario {} ({})", created.name, created.id);
        }
        ScenarioCommands::Delete { id, yes } => {
            runner
                .delete(&id, Confirmation::from_flag(yes))
                .await
                .map_err(report)?;
            println!("✓ Deleted scenario {}", id);
        }
    }

    Ok(())
}

fn print_list(scenarios: &[ScenarioRecord]) {
    println!();
    println!("  Scenarios");
    println!("  {}", "-".repeat(72));
    println!("  {:<14} {:<28} {:<10} Last Run", "ID", "Name", "Outcome");
    println!("  {}", "-".repeat(72));
    if scenarios.is_empty() {
        println!("  (no scenarios yet)");
    }
    for scenario in scenarios {
        let outcome = scenario
            .last_run_outcome
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        let last_run = scenario
            .last_run_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {:<14} {:<28} {:<10} {}",
            scenario.id, scenario.name, outcome, last_run
        );
    }
    println!();
}

fn print_result(result: &ScenarioResult) {
    println!();
    println!("  {} → {}", result.scenario_name, result.outcome);
    if let Some(notes) = &result.evaluation_notes {
        println!("    {}", notes);
    }
    if let Some(reply) = &result.reply {
        println!("    reply: {}", reply.text);
    }
    println!();
}

fn print_batch(batch: &BatchResult) {
    println!();
    println!("  Batch Results");
    println!("  {}", "-".repeat(72));
    for result in &batch.results {
        println!(
            "  {:<28} {:<10} {}",
            result.scenario_name,
            result.outcome.to_string(),
            result.evaluation_notes.as_deref().unwrap_or("")
        );
    }
    println!("  {}", "-".repeat(72));
    println!(
        "  pass: {}  fail: {}  unknown: {}  (total {})",
        batch.summary.pass,
        batch.summary.fail,
        batch.summary.unknown,
        batch.summary.total()
    );
    println!();
}
