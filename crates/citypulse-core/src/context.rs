//! Shared "which city are we looking at" context
//!
//! Components that need a default city (cost observer, scenario runner) get
//! one of these at construction instead of reading a global. Resolution
//! order: stored active city (session tier, then durable), then the backend's
//! current city.

use citypulse_remote::{CurrentCity, RemoteClient};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::storage::ActiveCityStore;

/// Resolves the active city per call
#[derive(Clone)]
pub struct CityContext {
    client: Arc<dyn RemoteClient>,
    store: ActiveCityStore,
}

impl CityContext {
    /// Create a context
    pub fn new(client: Arc<dyn RemoteClient>, store: ActiveCityStore) -> Self {
        Self { client, store }
    }

    /// Storage tiers behind this context
    pub fn store(&self) -> &ActiveCityStore {
        &self.store
    }

    /// Active city identifier
    pub async fn current_city_id(&self) -> Result<String> {
        if let Some(city_id) = self.store.read() {
            debug!(%city_id, "Active city from storage");
            return Ok(city_id);
        }
        Ok(self.current_city_from_backend().await?.city_id)
    }

    /// Active city as the backend reports it, bypassing storage
    pub async fn current_city_from_backend(&self) -> Result<CurrentCity> {
        let current = self.client.get_current_city().await?;
        debug!(city_id = %current.city_id, "Active city from backend");
        Ok(current)
    }
}
