//! Storage tiers for the active-city identifier
//!
//! Two tiers with distinct lifetimes:
//! - [`SessionStore`]: lives as long as the process (session-scoped)
//! - [`DurableStore`]: JSON file on disk (durable-scoped)
//!
//! Readers treat both tiers as optional; see [`crate::context::CityContext`]
//! for the fallback to the backend's current city.

mod durable;
mod session;

pub use durable::DurableStore;
pub use session::SessionStore;

use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key under which the active city identifier is stored in both tiers
pub const ACTIVE_CITY_KEY: &str = "citypulse.activeCityId";

/// Minimal key/value contract shared by both tiers
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value
    fn remove(&self, key: &str) -> Result<()>;
}

/// Which tiers accepted a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Session tier written
    pub session: bool,
    /// Durable tier written
    pub durable: bool,
}

/// Active-city identifier persisted across both tiers
#[derive(Clone)]
pub struct ActiveCityStore {
    session: Arc<dyn KeyValueStore>,
    durable: Arc<dyn KeyValueStore>,
}

impl ActiveCityStore {
    /// Create from explicit tiers
    pub fn new(session: Arc<dyn KeyValueStore>, durable: Arc<dyn KeyValueStore>) -> Self {
        Self { session, durable }
    }

    /// Session tier only; durable tier is another in-memory map.
    ///
    /// Useful for tests and one-shot commands that should leave no trace.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(SessionStore::new()), Arc::new(SessionStore::new()))
    }

    /// Write the active city to both tiers.
    ///
    /// The session write must succeed. The durable write is best-effort: its
    /// failure is logged and reported in the outcome, never returned.
    pub fn persist(&self, city_id: &str) -> Result<PersistOutcome> {
        self.session.set(ACTIVE_CITY_KEY, city_id)?;

        let durable = match self.durable.set(ACTIVE_CITY_KEY, city_id) {
            Ok(()) => true,
            Err(e) => {
                warn!(city_id, error = %e, "Durable write of active city failed");
                false
            }
        };

        debug!(city_id, durable, "Active city persisted");
        Ok(PersistOutcome {
            session: true,
            durable,
        })
    }

    /// Stored active city: session tier first, then durable.
    ///
    /// Read errors count as "not stored".
    pub fn read(&self) -> Option<String> {
        read_tier("session", self.session.as_ref())
            .or_else(|| read_tier("durable", self.durable.as_ref()))
    }

    /// Forget the active city in both tiers
    pub fn clear(&self) -> Result<()> {
        self.session.remove(ACTIVE_CITY_KEY)?;
        if let Err(e) = self.durable.remove(ACTIVE_CITY_KEY) {
            warn!(error = %e, "Durable removal of active city failed");
        }
        Ok(())
    }
}

fn read_tier(tier: &str, store: &dyn KeyValueStore) -> Option<String> {
    match store.get(ACTIVE_CITY_KEY) {
        Ok(value) => value.filter(|v| !v.trim().is_empty()),
        Err(e) => {
            debug!(tier, error = %e, "Active city read failed");
            None
        }
    }
}
