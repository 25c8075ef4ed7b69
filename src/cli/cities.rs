//! CLI command: `citypulse cities`

use citypulse_core::{load_catalog, CatalogSource};

use crate::app::App;

/// Print the city catalog
pub async fn run(app: &App) -> anyhow::Result<()> {
    let catalog = load_catalog(app.client.as_ref()).await;
    let active = app.store.read();

    println!();
    println!("  Cities");
    println!("  {}", "-".repeat(64));
    println!(
        "  {:<12} {:<22} {:<10} {:>14}",
        "ID", "Name", "Region", "Population"
    );
    println!("  {}", "-".repeat(64));
    for city in &catalog.cities {
        let marker = if active.as_deref() == Some(city.id.as_str()) {
            " *"
        } else {
            ""
        };
        let population = city
            .population
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<12} {:<22} {:<10} {:>14}{}",
            city.id, city.name, city.region, population, marker
        );
    }
    println!("  {}", "-".repeat(64));
    if catalog.source == CatalogSource::Fallback {
        println!("  (registry unavailable, showing built-in catalog)");
    }
    println!();

    Ok(())
}
