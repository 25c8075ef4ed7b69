//! Cost observer
//!
//! Keeps the cost breakdown of the active city current. It listens on the
//! event bus and re-fetches whenever a city is activated or reprocessed.

use citypulse_remote::{CostBreakdown, RemoteClient};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::CityContext;
use crate::error::{Error, Result};
use crate::event_bus::{BusEvent, EventBus};

/// What the cost panel renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostState {
    /// City the figures belong to
    pub city_id: Option<String>,
    /// Latest breakdown
    pub costs: Option<CostBreakdown>,
    /// Failure of the last fetch
    pub error: Option<String>,
}

/// Re-fetches costs on activation events
pub struct CostObserver {
    client: Arc<dyn RemoteClient>,
    context: CityContext,
    state: watch::Sender<CostState>,
}

impl CostObserver {
    /// Create an observer with no figures
    pub fn new(client: Arc<dyn RemoteClient>, context: CityContext) -> Self {
        let (state, _) = watch::channel(CostState::default());
        Self {
            client,
            context,
            state,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CostState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every update
    pub fn subscribe(&self) -> watch::Receiver<CostState> {
        self.state.subscribe()
    }

    /// Fetch costs for a city
    pub async fn refresh(&self, city_id: &str) -> Result<CostBreakdown> {
        match self.client.get_costs(city_id).await {
            Ok(costs) => {
                debug!(%city_id, total_usd = costs.total_usd, "Costs refreshed");
                let city = city_id.to_string();
                let fresh = costs.clone();
                self.state.send_modify(|s| {
                    s.city_id = Some(city);
                    s.costs = Some(fresh);
                    s.error = None;
                });
                Ok(costs)
            }
            Err(e) => {
                warn!(%city_id, error = %e, "Failed to fetch costs");
                let err = Error::from(e);
                let message = err.to_string();
                let city = city_id.to_string();
                self.state.send_modify(|s| {
                    if s.city_id.as_deref() != Some(city.as_str()) {
                        s.costs = None;
                    }
                    s.city_id = Some(city);
                    s.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Fetch costs for whichever city the context resolves
    pub async fn refresh_current(&self) -> Result<CostBreakdown> {
        let city_id = self.context.current_city_id().await?;
        self.refresh(&city_id).await
    }

    /// Follow the bus until `shutdown` fires.
    ///
    /// The receiver is registered before this returns, so events published
    /// afterwards are never missed.
    pub fn spawn(self: Arc<Self>, bus: &EventBus, shutdown: CancellationToken) -> JoinHandle<()> {
        let mut events = bus.watch();
        tokio::spawn(async move {
            info!("Cost observer started");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => self.handle(&event).await,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Cost observer lagged behind the event bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            info!("Cost observer stopped");
        })
    }

    async fn handle(&self, event: &BusEvent) {
        match event {
            BusEvent::ActiveCityChanged { city_id, .. } | BusEvent::CityProcessed { city_id, .. } => {
                // Failures are already on the state
                let _ = self.refresh(city_id).await;
            }
            BusEvent::OpenCitySelector => {}
        }
    }
}
