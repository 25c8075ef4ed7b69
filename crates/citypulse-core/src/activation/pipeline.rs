use citypulse_remote::RemoteClient;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::state::{ActivationState, ActivationStep, FailureKind, SelectedCity};
use crate::error::{Error, Result};
use crate::event_bus::{BusEvent, EventBus};
use crate::storage::{ActiveCityStore, PersistOutcome};

/// City activation pipeline
///
/// Stages run strictly in order; each one starts only after the previous
/// settled. The pipeline does not serialise concurrent [`activate`] calls:
/// callers disable their trigger while [`is_busy`] is true.
///
/// [`activate`]: ActivationPipeline::activate
/// [`is_busy`]: ActivationPipeline::is_busy
pub struct ActivationPipeline {
    client: Arc<dyn RemoteClient>,
    bus: EventBus,
    store: ActiveCityStore,
    state: watch::Sender<ActivationState>,
}

impl ActivationPipeline {
    /// Create an idle pipeline
    pub fn new(client: Arc<dyn RemoteClient>, bus: EventBus, store: ActiveCityStore) -> Self {
        let (state, _) = watch::channel(ActivationState::default());
        Self {
            client,
            bus,
            store,
            state,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ActivationState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state transition
    pub fn subscribe(&self) -> watch::Receiver<ActivationState> {
        self.state.subscribe()
    }

    /// A run is in progress
    pub fn is_busy(&self) -> bool {
        self.state.borrow().step.is_in_flight()
    }

    /// Activate a city. Never returns an error: failures end in
    /// [`ActivationStep::Failed`] with `error` set.
    pub async fn activate(&self, city_id: &str) -> ActivationState {
        let activation_id = Uuid::new_v4();
        let span = info_span!("activation", %activation_id, city_id);
        self.run(city_id).instrument(span).await
    }

    async fn run(&self, city_id: &str) -> ActivationState {
        self.state.send_modify(ActivationState::begin);
        info!("Selecting city");

        let response = match self.client.select_city(city_id).await {
            Ok(response) => response,
            Err(e) => {
                return self.fail(
                    FailureKind::SelectionFailed,
                    format!("Failed to select city '{}': {}", city_id, e),
                );
            }
        };
        if response.is_rejected() {
            let reason = response
                .error
                .unwrap_or_else(|| format!("City '{}' selection was rejected", city_id));
            return self.fail(FailureKind::SelectionRejected, reason);
        }

        let selected = SelectedCity {
            city_id: city_id.to_string(),
            name: response
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| city_id.to_string()),
        };
        self.state.send_modify(|s| {
            s.selected_city = Some(selected.clone());
            s.step = ActivationStep::Processing;
        });
        info!(name = %selected.name, "City selected, processing zones");

        let summary = match self.client.process_all_zones(city_id).await {
            Ok(response) => response.summary,
            Err(e) => {
                return self.fail(
                    FailureKind::ZoneProcessingFailed,
                    format!("Zone processing failed for '{}': {}", city_id, e),
                );
            }
        };
        info!(
            successful = summary.successful,
            total = summary.total,
            "Zones processed"
        );
        self.state.send_modify(|s| {
            s.zones_summary = Some(summary.clone());
            s.step = ActivationStep::Eia;
        });

        // Best-effort enrichment
        if let Err(e) = self.client.process_eia(city_id).await {
            warn!(error = %e, "EIA processing failed, continuing");
        }

        self.state.send_modify(|s| s.step = ActivationStep::Complete);
        info!("Activation complete");

        self.bus.publish(BusEvent::ActiveCityChanged {
            city_id: selected.city_id.clone(),
            name: selected.name,
        });
        self.bus.publish(BusEvent::CityProcessed {
            city_id: selected.city_id,
            summary,
        });

        self.state()
    }

    fn fail(&self, kind: FailureKind, message: String) -> ActivationState {
        warn!(?kind, error = %message, "Activation failed");
        self.state.send_modify(|s| s.fail(kind, message));
        self.state()
    }

    /// Persist the activated city to the session and durable tiers.
    ///
    /// Only valid after a completed activation. A durable-tier failure is
    /// absorbed and reported in the outcome.
    pub fn finalize_selection(&self) -> Result<PersistOutcome> {
        let state = self.state();
        match (state.step, state.selected_city) {
            (ActivationStep::Complete, Some(city)) => {
                let outcome = self.store.persist(&city.city_id)?;
                info!(city_id = %city.city_id, durable = outcome.durable, "Selection finalized");
                Ok(outcome)
            }
            (step, _) => Err(Error::InvalidState(format!(
                "no completed activation to finalize (step: {})",
                step
            ))),
        }
    }

    /// Ask whichever screen owns the city selector to open it
    pub fn request_city_selector(&self) -> usize {
        self.bus.publish(BusEvent::OpenCitySelector)
    }
}
