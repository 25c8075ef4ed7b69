use citypulse_remote::{CityRecord, RemoteClient};
use tracing::{info, warn};

/// Where a catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// City registry
    Remote,
    /// Built-in list
    Fallback,
}

/// Cities the user can activate
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Cities in display order
    pub cities: Vec<CityRecord>,
    /// Origin
    pub source: CatalogSource,
}

impl Catalog {
    /// Look up a city by identifier
    pub fn find(&self, city_id: &str) -> Option<&CityRecord> {
        self.cities.iter().find(|c| c.id == city_id)
    }
}

/// Built-in catalog used when the registry is unavailable
pub fn fallback_catalog() -> Vec<CityRecord> {
    vec![
        CityRecord::new("nyc", "New York City", "NY", "USA", Some(8_336_817)),
        CityRecord::new("la", "Los Angeles", "CA", "USA", Some(3_822_238)),
        CityRecord::new("chicago", "Chicago", "IL", "USA", Some(2_665_039)),
        CityRecord::new("sf", "San Francisco", "CA", "USA", Some(808_437)),
        CityRecord::new("seattle", "Seattle", "WA", "USA", Some(749_256)),
    ]
}

/// Registry catalog, or the built-in one if the registry fails or is empty
pub async fn load_catalog(client: &dyn RemoteClient) -> Catalog {
    match client.list_cities().await {
        Ok(cities) if !cities.is_empty() => {
            info!(count = cities.len(), "Loaded city catalog");
            Catalog {
                cities,
                source: CatalogSource::Remote,
            }
        }
        Ok(_) => {
            warn!("City registry returned no cities, using built-in catalog");
            Catalog {
                cities: fallback_catalog(),
                source: CatalogSource::Fallback,
            }
        }
        Err(e) => {
            warn!(error = %e, "City registry unavailable, using built-in catalog");
            Catalog {
                cities: fallback_catalog(),
                source: CatalogSource::Fallback,
            }
        }
    }
}
