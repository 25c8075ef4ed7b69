//! CLI command: `citypulse activate <CITY_ID>`
//!
//! Runs the activation pipeline, printing each step as it happens, then
//! shows the costs the observer fetched in response to the bus events.

use citypulse_core::{ActivationStep, CostState};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::report;
use crate::app::App;

/// How long to wait for the cost observer after activation
const COST_WAIT: Duration = Duration::from_secs(10);

/// Run the activate subcommand.
pub async fn run(app: &App, city_id: &str, persist: bool) -> anyhow::Result<()> {
    let pipeline = app.pipeline();
    let shutdown = CancellationToken::new();
    let observer = app.cost_observer();
    let observer_task = observer.clone().spawn(&app.bus, shutdown.clone());
    let mut costs = observer.subscribe();

    let mut progress = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        let mut last = ActivationStep::Idle;
        while progress.changed().await.is_ok() {
            let step = progress.borrow_and_update().step;
            if step != last && step.is_in_flight() {
                println!("  … {}", step);
            }
            last = step;
        }
    });

    println!();
    println!("  Activating '{}'", city_id);
    let state = pipeline.activate(city_id).await;

    if state.step != ActivationStep::Complete {
        shutdown.cancel();
        let _ = observer_task.await;
        drop(pipeline);
        let _ = printer.await;
        anyhow::bail!(
            "❌ Activation failed: {}",
            state.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    if let (Some(city), Some(summary)) = (&state.selected_city, &state.zones_summary) {
        println!("  ✓ {} ({}) active", city.name, city.city_id);
        println!(
            "    zones processed: {}/{} ({} failed)",
            summary.successful,
            summary.total,
            summary.failed()
        );
    }

    if persist {
        let outcome = pipeline.finalize_selection().map_err(report)?;
        if !outcome.durable {
            println!("    (saved for this session only)");
        }
    }

    let target = city_id.to_string();
    // Clone out of the watch guard before awaiting anything else
    let settled: Option<CostState> = tokio::time::timeout(
        COST_WAIT,
        costs.wait_for(|s: &CostState| {
            s.city_id.as_deref() == Some(target.as_str()) && (s.costs.is_some() || s.error.is_some())
        }),
    )
    .await
    .ok()
    .and_then(|r| r.ok().map(|state| state.clone()));
    match settled {
        Some(state) => print_costs(&state),
        None => println!("    costs: not available yet"),
    }

    shutdown.cancel();
    let _ = observer_task.await;
    drop(pipeline);
    let _ = printer.await;
    println!();
    Ok(())
}

fn print_costs(state: &CostState) {
    match (&state.costs, &state.error) {
        (Some(costs), _) => println!(
            "    costs: ${:.2} total (energy ${:.2}, CO2 ${:.2}, AQI ${:.2}, incidents ${:.2})",
            costs.total_usd, costs.energy_usd, costs.co2_usd, costs.aqi_usd, costs.incident_usd
        ),
        (None, Some(error)) => println!("    costs: unavailable ({})", error),
        (None, None) => println!("    costs: not available yet"),
    }
}
