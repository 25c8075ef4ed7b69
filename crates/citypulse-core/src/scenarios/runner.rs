use citypulse_remote::{BatchResult, BatchSummary, RemoteClient, ScenarioRecord, ScenarioResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::draft::{Confirmation, ScenarioDraft};
use crate::context::CityContext;
use crate::error::{Error, Result};

/// What the scenario screen renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioBoard {
    /// Scenarios in backend order (most recently created first)
    pub scenarios: Vec<ScenarioRecord>,
    /// Last batch run, summary recomputed from its results
    pub last_batch: Option<BatchResult>,
    /// Last single run
    pub last_run: Option<ScenarioResult>,
    /// Last surfaced failure
    pub error: Option<String>,
    /// An operation is in progress
    pub busy: bool,
}

/// Scenario batch runner
pub struct ScenarioRunner {
    client: Arc<dyn RemoteClient>,
    context: CityContext,
    board: watch::Sender<ScenarioBoard>,
}

impl ScenarioRunner {
    /// Create a runner with an empty board
    pub fn new(client: Arc<dyn RemoteClient>, context: CityContext) -> Self {
        let (board, _) = watch::channel(ScenarioBoard::default());
        Self {
            client,
            context,
            board,
        }
    }

    /// Snapshot of the board
    pub fn board(&self) -> ScenarioBoard {
        self.board.borrow().clone()
    }

    /// Receiver that sees every board update
    pub fn subscribe(&self) -> watch::Receiver<ScenarioBoard> {
        self.board.subscribe()
    }

    /// Load every scenario. Order is the backend's; no local sort.
    pub async fn list(&self) -> Result<Vec<ScenarioRecord>> {
        match self.client.list_scenarios().await {
            Ok(scenarios) => {
                debug!(count = scenarios.len(), "Scenarios loaded");
                self.board.send_modify(|b| {
                    b.scenarios = scenarios.clone();
                    b.error = None;
                });
                Ok(scenarios)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load scenarios");
                let err = Error::from(e);
                self.set_error(&err);
                Err(err)
            }
        }
    }

    /// Run one scenario, then reload the list.
    ///
    /// A failed run is returned as an error; the scenario stays listed.
    pub async fn run_one(&self, id: &str, city_id: Option<&str>) -> Result<ScenarioResult> {
        let _busy = Busy::enter(&self.board);
        let city = self.resolve_city(city_id).await;
        info!(scenario_id = %id, city_id = ?city, "Running scenario");

        let outcome = self.client.run_scenario(id, city.as_deref()).await;
        let result = match outcome {
            Ok(result) => {
                info!(
                    scenario_id = %id,
                    outcome = %result.outcome,
                    "Scenario finished"
                );
                self.board.send_modify(|b| {
                    b.last_run = Some(result.clone());
                    b.error = None;
                });
                Ok(result)
            }
            Err(e) => {
                warn!(scenario_id = %id, error = %e, "Scenario run failed");
                let err = Error::from(e);
                self.set_error(&err);
                Err(err)
            }
        };

        self.resync(result.is_err()).await;
        result
    }

    /// Run every scenario as a batch, then reload the list.
    ///
    /// The summary is the tally of the returned results; a reported summary
    /// that disagrees is logged and replaced.
    pub async fn run_all(&self, city_id: Option<&str>) -> Result<BatchResult> {
        let _busy = Busy::enter(&self.board);
        let city = self.resolve_city(city_id).await;
        info!(city_id = ?city, "Running scenario batch");

        let result = match self.client.run_batch(city.as_deref()).await {
            Ok(mut batch) => {
                let tally = BatchSummary::tally(&batch.results);
                if tally != batch.summary {
                    warn!(
                        reported = ?batch.summary,
                        tallied = ?tally,
                        "Batch summary disagrees with results, using tally"
                    );
                    batch.summary = tally;
                }
                info!(
                    pass = tally.pass,
                    fail = tally.fail,
                    unknown = tally.unknown,
                    "Scenario batch finished"
                );
                self.board.send_modify(|b| {
                    b.last_batch = Some(batch.clone());
                    b.error = None;
                });
                Ok(batch)
            }
            Err(e) => {
                warn!(error = %e, "Scenario batch failed");
                let err = Error::from(e);
                self.set_error(&err);
                Err(err)
            }
        };

        self.resync(result.is_err()).await;
        result
    }

    /// Validate locally, then create. Invalid drafts never reach the
    /// backend.
    pub async fn create(&self, draft: ScenarioDraft) -> Result<ScenarioRecord> {
        let request = match draft.into_request() {
            Ok(request) => request,
            Err(e) => {
                self.set_error(&e);
                return Err(e);
            }
        };

        let created = self.client.create_scenario(&request).await.map_err(|e| {
            warn!(error = %e, "Failed to create scenario");
            let err = Error::from(e);
            self.set_error(&err);
            err
        })?;
        info!(scenario_id = %created.id, name = %created.name, "Scenario created");

        if let Err(e) = self.list().await {
            debug!(error = %e, "Reload after create failed");
        }
        Ok(created)
    }

    /// Delete a scenario. Without confirmation nothing is sent.
    pub async fn delete(&self, id: &str, confirmation: Confirmation) -> Result<()> {
        if confirmation != Confirmation::Confirmed {
            return Err(Error::ConfirmationRequired(format!(
                "deleting scenario '{}'",
                id
            )));
        }

        self.client.delete_scenario(id).await.map_err(|e| {
            warn!(scenario_id = %id, error = %e, "Failed to delete scenario");
            let err = Error::from(e);
            self.set_error(&err);
            err
        })?;
        info!(scenario_id = %id, "Scenario deleted");

        self.board
            .send_modify(|b| b.scenarios.retain(|s| s.id != id));
        if let Err(e) = self.list().await {
            debug!(error = %e, "Reload after delete failed");
        }
        Ok(())
    }

    /// Explicit city, else the context's active city, else none
    async fn resolve_city(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(city) = explicit.filter(|c| !c.trim().is_empty()) {
            return Some(city.to_string());
        }
        match self.context.current_city_id().await {
            Ok(city) => Some(city),
            Err(e) => {
                debug!(error = %e, "No active city, running without one");
                None
            }
        }
    }

    /// Reload after a run. When the run already failed, keep its error on
    /// the board instead of clearing it with a successful reload.
    async fn resync(&self, keep_error: bool) {
        match self.client.list_scenarios().await {
            Ok(scenarios) => self.board.send_modify(|b| b.scenarios = scenarios),
            Err(e) => {
                warn!(error = %e, "Failed to reload scenarios after run");
                if !keep_error {
                    self.set_error(&Error::from(e));
                }
            }
        }
    }

    fn set_error(&self, error: &Error) {
        let message = error.to_string();
        self.board.send_modify(|b| b.error = Some(message));
    }
}

/// Holds `busy` on the board until dropped, so an abandoned run does not
/// leave the board stuck.
struct Busy<'a> {
    board: &'a watch::Sender<ScenarioBoard>,
}

impl<'a> Busy<'a> {
    fn enter(board: &'a watch::Sender<ScenarioBoard>) -> Self {
        board.send_modify(|b| b.busy = true);
        Self { board }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.board.send_modify(|b| b.busy = false);
    }
}
