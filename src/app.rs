//! Component wiring
//!
//! Builds the remote client, bus, storage tiers and city context once, and
//! hands them to whichever component a command needs.

use anyhow::{Context, Result};
use citypulse_core::{
    ActivationPipeline, ActiveCityStore, CityContext, CostObserver, DurableStore, EventBus,
    LiveStreamAggregator, ScenarioRunner, SessionStore,
};
use citypulse_remote::{HttpRemoteClient, RemoteClient};
use std::sync::Arc;
use tracing::debug;

use crate::settings::AppConfig;

/// Shared services for one CLI invocation
pub struct App {
    pub config: AppConfig,
    pub client: Arc<dyn RemoteClient>,
    pub bus: EventBus,
    pub store: ActiveCityStore,
    pub context: CityContext,
}

impl App {
    /// Wire everything from configuration; `api_url` overrides the
    /// configured backend.
    pub fn build(mut config: AppConfig, api_url: Option<String>) -> Result<Self> {
        if let Some(url) = api_url.or_else(|| std::env::var(citypulse_remote::http::ENV_API_URL).ok()) {
            config.remote.base_url = url;
        }

        let client: Arc<dyn RemoteClient> = Arc::new(
            HttpRemoteClient::new(config.remote.to_client_config())
                .context("Failed to create backend client")?,
        );
        debug!(base_url = %config.remote.base_url, "Backend client ready");

        let durable = match &config.storage.durable_path {
            Some(path) => DurableStore::new(path.clone()),
            None => DurableStore::default_location().context("Failed to locate data directory")?,
        };
        debug!(path = %durable.path().display(), "Durable store");

        let store = ActiveCityStore::new(Arc::new(SessionStore::new()), Arc::new(durable));
        let bus = EventBus::new(config.event_bus.capacity);
        let context = CityContext::new(client.clone(), store.clone());

        Ok(Self {
            config,
            client,
            bus,
            store,
            context,
        })
    }

    pub fn pipeline(&self) -> ActivationPipeline {
        ActivationPipeline::new(self.client.clone(), self.bus.clone(), self.store.clone())
    }

    pub fn cost_observer(&self) -> Arc<CostObserver> {
        Arc::new(CostObserver::new(self.client.clone(), self.context.clone()))
    }

    pub fn aggregator(&self) -> Arc<LiveStreamAggregator> {
        Arc::new(LiveStreamAggregator::new(
            self.client.clone(),
            self.config.stream.to_stream_config(),
        ))
    }

    pub fn scenario_runner(&self) -> ScenarioRunner {
        ScenarioRunner::new(self.client.clone(), self.context.clone())
    }
}
