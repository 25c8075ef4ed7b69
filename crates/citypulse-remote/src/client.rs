//! Remote client trait
//!
//! Every component in `citypulse-core` talks to the backend through this
//! trait, so the HTTP implementation and the test mock are interchangeable.

use async_trait::async_trait;

use crate::error::Result;
use crate::scenario::{BatchResult, NewScenario, ScenarioRecord, ScenarioResult};
use crate::types::{
    CityRecord, CostBreakdown, CurrentCity, ProcessZonesResponse, RawStreamSnapshot,
    SelectCityResponse,
};

/// Request/response access to the city registry, zone backend, EIA job,
/// live-stream consumer and scenario agent.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Client name for logging
    fn name(&self) -> &str;

    /// List the cities the registry knows about
    async fn list_cities(&self) -> Result<Vec<CityRecord>>;

    /// Make a city the backend's active city
    async fn select_city(&self, city_id: &str) -> Result<SelectCityResponse>;

    /// Fetch and model every zone of a city
    async fn process_all_zones(&self, city_id: &str) -> Result<ProcessZonesResponse>;

    /// Run the EIA energy ingestion for a city
    async fn process_eia(&self, city_id: &str) -> Result<serde_json::Value>;

    /// The backend's currently active city
    async fn get_current_city(&self) -> Result<CurrentCity>;

    /// Cost breakdown for a city
    async fn get_costs(&self, city_id: &str) -> Result<CostBreakdown>;

    /// Multi-topic live-stream snapshot, at most `limit` records per topic
    async fn get_live_stream(&self, limit: usize) -> Result<RawStreamSnapshot>;

    /// All scenarios, in the backend's order
    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>>;

    /// Store a new scenario
    async fn create_scenario(&self, scenario: &NewScenario) -> Result<ScenarioRecord>;

    /// Execute one scenario against the agent
    async fn run_scenario(&self, id: &str, city_id: Option<&str>) -> Result<ScenarioResult>;

    /// Execute every scenario against the agent
    async fn run_batch(&self, city_id: Option<&str>) -> Result<BatchResult>;

    /// Delete a scenario
    async fn delete_scenario(&self, id: &str) -> Result<()>;
}
