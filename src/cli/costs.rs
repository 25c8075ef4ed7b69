//! CLI command: `citypulse costs`

use citypulse_remote::CostBreakdown;

use super::report;
use crate::app::App;

/// Print the cost breakdown for a city (the active one by default)
pub async fn run(app: &App, city: Option<&str>) -> anyhow::Result<()> {
    let observer = app.cost_observer();
    let costs = match city {
        Some(city_id) => observer.refresh(city_id).await,
        None => observer.refresh_current().await,
    }
    .map_err(report)?;

    let city_id = observer.state().city_id.unwrap_or_default();
    print_table(&city_id, &costs);
    Ok(())
}

fn print_table(city_id: &str, costs: &CostBreakdown) {
    println!();
    println!("  Costs for {}", city_id);
    println!("  {}", "-".repeat(40));
    println!("  {:<18} {:>18}", "Energy", format!("${:.2}", costs.energy_usd));
    println!("  {:<18} {:>18}", "CO2", format!("${:.2}", costs.co2_usd));
    println!("  {:<18} {:>18}", "Air quality", format!("${:.2}", costs.aqi_usd));
    println!(
        "  {:<18} {:>18}",
        format!("Incidents ({})", costs.incident_count),
        format!("${:.2}", costs.incident_usd)
    );
    println!("  {}", "-".repeat(40));
    println!("  {:<18} {:>18}", "Total", format!("${:.2}", costs.total_usd));
    println!(
        "  {:.0} kWh at ${:.4}/kWh{}",
        costs.total_kwh,
        costs.price_per_kwh,
        if costs.source.is_empty() {
            String::new()
        } else {
            format!(" (source: {})", costs.source)
        }
    );
    println!();
}
