//! Mock remote client for testing
//!
//! Responses are configured up front (or between calls) and every trait
//! method bumps a per-operation call counter, so tests can assert both what a
//! component saw and which calls it made. Scenarios live in memory and runs
//! are classified with [`evaluate`] against scripted agent replies.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::client::RemoteClient;
use crate::error::{Error, Result};
use crate::scenario::{
    evaluate, AgentReply, BatchResult, BatchSummary, NewScenario, ScenarioRecord, ScenarioResult,
};
use crate::types::{
    CityRecord, CostBreakdown, CurrentCity, ProcessZonesResponse, RawStreamSnapshot,
    SelectCityResponse, ZonesSummary,
};

/// Operation names used by [`MockRemoteClient::call_count`]
pub mod ops {
    /// `list_cities`
    pub const LIST_CITIES: &str = "list_cities";
    /// `select_city`
    pub const SELECT_CITY: &str = "select_city";
    /// `process_all_zones`
    pub const PROCESS_ZONES: &str = "process_all_zones";
    /// `process_eia`
    pub const PROCESS_EIA: &str = "process_eia";
    /// `get_current_city`
    pub const CURRENT_CITY: &str = "get_current_city";
    /// `get_costs`
    pub const GET_COSTS: &str = "get_costs";
    /// `get_live_stream`
    pub const LIVE_STREAM: &str = "get_live_stream";
    /// `list_scenarios`
    pub const LIST_SCENARIOS: &str = "list_scenarios";
    /// `create_scenario`
    pub const CREATE_SCENARIO: &str = "create_scenario";
    /// `run_scenario`
    pub const RUN_SCENARIO: &str = "run_scenario";
    /// `run_batch`
    pub const RUN_BATCH: &str = "run_batch";
    /// `delete_scenario`
    pub const DELETE_SCENARIO: &str = "delete_scenario";
}

struct MockState {
    cities: Result<Vec<CityRecord>>,
    select: HashMap<String, Result<SelectCityResponse>>,
    zones: Result<ZonesSummary>,
    zones_delay: Option<Duration>,
    eia: Result<serde_json::Value>,
    current_city: Result<CurrentCity>,
    costs: HashMap<String, CostBreakdown>,
    streams: VecDeque<(Option<Duration>, Result<RawStreamSnapshot>)>,
    scenarios: Vec<ScenarioRecord>,
    replies: HashMap<String, AgentReply>,
    run_error: Option<Error>,
    run_delay: Option<Duration>,
    batch_error: Option<Error>,
    reported_summary: Option<BatchSummary>,
    next_scenario_id: u64,
    calls: HashMap<&'static str, usize>,
    last_run_city: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            cities: Ok(Vec::new()),
            select: HashMap::new(),
            zones: Ok(ZonesSummary::new(10, 10)),
            zones_delay: None,
            eia: Ok(serde_json::json!({"ok": true})),
            current_city: Err(Error::Api {
                status: 404,
                message: "no active city".to_string(),
            }),
            costs: HashMap::new(),
            streams: VecDeque::new(),
            scenarios: Vec::new(),
            replies: HashMap::new(),
            run_error: None,
            run_delay: None,
            batch_error: None,
            reported_summary: None,
            next_scenario_id: 1,
            calls: HashMap::new(),
            last_run_city: None,
        }
    }
}

/// A mock remote client with scripted responses
#[derive(Default)]
pub struct MockRemoteClient {
    state: Mutex<MockState>,
}

impl MockRemoteClient {
    /// Create a mock with default responses
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: &'static str) {
        *self.lock().calls.entry(op).or_insert(0) += 1;
    }

    async fn run_delay(&self) {
        let delay = self.lock().run_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// How many times an operation (see [`ops`]) was called
    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or(0)
    }

    /// City passed to the most recent scenario or batch run
    pub fn last_run_city(&self) -> Option<String> {
        self.lock().last_run_city.clone()
    }

    /// Registry contents
    pub fn set_cities(&self, cities: Vec<CityRecord>) {
        self.lock().cities = Ok(cities);
    }

    /// Make `list_cities` fail
    pub fn fail_cities(&self, error: Error) {
        self.lock().cities = Err(error);
    }

    /// Response to `select_city` for one city
    pub fn set_select_response(&self, city_id: &str, response: Result<SelectCityResponse>) {
        self.lock().select.insert(city_id.to_string(), response);
    }

    /// Response to `process_all_zones`
    pub fn set_zones_result(&self, result: Result<ZonesSummary>) {
        self.lock().zones = result;
    }

    /// Delay before `process_all_zones` answers
    pub fn set_zones_delay(&self, delay: Duration) {
        self.lock().zones_delay = Some(delay);
    }

    /// Response to `process_eia`
    pub fn set_eia_result(&self, result: Result<serde_json::Value>) {
        self.lock().eia = result;
    }

    /// Response to `get_current_city`
    pub fn set_current_city(&self, result: Result<CurrentCity>) {
        self.lock().current_city = result;
    }

    /// Cost breakdown for a city
    pub fn set_costs(&self, city_id: &str, costs: CostBreakdown) {
        self.lock().costs.insert(city_id.to_string(), costs);
    }

    /// Queue a live-stream response
    pub fn push_stream(&self, result: Result<RawStreamSnapshot>) {
        self.lock().streams.push_back((None, result));
    }

    /// Queue a live-stream response that resolves after `delay`
    pub fn push_delayed_stream(&self, delay: Duration, result: Result<RawStreamSnapshot>) {
        self.lock().streams.push_back((Some(delay), result));
    }

    /// Add a stored scenario (newest first, like the backend)
    pub fn add_scenario(&self, scenario: ScenarioRecord) {
        self.lock().scenarios.insert(0, scenario);
    }

    /// Agent reply for a given input message
    pub fn set_agent_reply(&self, input_message: &str, reply: AgentReply) {
        self.lock()
            .replies
            .insert(input_message.to_string(), reply);
    }

    /// Make `run_scenario` fail
    pub fn set_run_error(&self, error: Option<Error>) {
        self.lock().run_error = error;
    }

    /// Delay before `run_scenario` and `run_batch` answer
    pub fn set_run_delay(&self, delay: Duration) {
        self.lock().run_delay = Some(delay);
    }

    /// Make `run_batch` fail (after running, like a batch that died midway)
    pub fn set_batch_error(&self, error: Option<Error>) {
        self.lock().batch_error = error;
    }

    /// Summary `run_batch` reports instead of the real tally
    pub fn set_reported_summary(&self, summary: Option<BatchSummary>) {
        self.lock().reported_summary = summary;
    }

    /// Stored scenarios
    pub fn scenarios(&self) -> Vec<ScenarioRecord> {
        self.lock().scenarios.clone()
    }

    fn execute(state: &mut MockState, index: usize) -> ScenarioResult {
        let scenario = &state.scenarios[index];
        let reply = state
            .replies
            .get(&scenario.input_message)
            .cloned()
            .unwrap_or_default();
        let evaluation = evaluate(scenario.expected_outcome.as_ref(), &reply);

        let result = ScenarioResult {
            scenario_id: Some(scenario.id.clone()),
            scenario_name: scenario.name.clone(),
            outcome: evaluation.outcome,
            evaluation_notes: Some(evaluation.notes),
            reply: Some(reply),
        };

        let scenario = &mut state.scenarios[index];
        scenario.last_run_outcome = Some(result.outcome);
        scenario.last_run_at = Some(Utc::now());
        result
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_cities(&self) -> Result<Vec<CityRecord>> {
        self.record(ops::LIST_CITIES);
        self.lock().cities.clone()
    }

    async fn select_city(&self, city_id: &str) -> Result<SelectCityResponse> {
        self.record(ops::SELECT_CITY);
        let state = self.lock();
        if let Some(response) = state.select.get(city_id) {
            return response.clone();
        }

        let name = state
            .cities
            .as_ref()
            .ok()
            .and_then(|cities| cities.iter().find(|c| c.id == city_id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| city_id.to_string());
        Ok(SelectCityResponse::accepted(city_id, name))
    }

    async fn process_all_zones(&self, _city_id: &str) -> Result<ProcessZonesResponse> {
        self.record(ops::PROCESS_ZONES);
        let (delay, result) = {
            let state = self.lock();
            (state.zones_delay, state.zones.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result.map(|summary| ProcessZonesResponse { summary })
    }

    async fn process_eia(&self, _city_id: &str) -> Result<serde_json::Value> {
        self.record(ops::PROCESS_EIA);
        self.lock().eia.clone()
    }

    async fn get_current_city(&self) -> Result<CurrentCity> {
        self.record(ops::CURRENT_CITY);
        self.lock().current_city.clone()
    }

    async fn get_costs(&self, city_id: &str) -> Result<CostBreakdown> {
        self.record(ops::GET_COSTS);
        self.lock()
            .costs
            .get(city_id)
            .cloned()
            .ok_or_else(|| Error::Api {
                status: 404,
                message: format!("no costs for {city_id}"),
            })
    }

    async fn get_live_stream(&self, _limit: usize) -> Result<RawStreamSnapshot> {
        self.record(ops::LIVE_STREAM);
        let next = self.lock().streams.pop_front();
        match next {
            Some((delay, result)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(RawStreamSnapshot {
                ok: true,
                ..Default::default()
            }),
        }
    }

    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>> {
        self.record(ops::LIST_SCENARIOS);
        Ok(self.lock().scenarios.clone())
    }

    async fn create_scenario(&self, scenario: &NewScenario) -> Result<ScenarioRecord> {
        self.record(ops::CREATE_SCENARIO);
        let mut state = self.lock();
        let record = ScenarioRecord {
            id: format!("scn-{}", state.next_scenario_id),
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            input_message: scenario.input_message.clone(),
            city_id: scenario.city_id.clone(),
            expected_outcome: scenario.expected_outcome.clone(),
            last_run_outcome: None,
            last_run_at: None,
        };
        state.next_scenario_id += 1;
        state.scenarios.insert(0, record.clone());
        Ok(record)
    }

    async fn run_scenario(&self, id: &str, city_id: Option<&str>) -> Result<ScenarioResult> {
        self.record(ops::RUN_SCENARIO);
        self.run_delay().await;
        let mut state = self.lock();
        state.last_run_city = city_id.map(str::to_string);
        if let Some(error) = state.run_error.clone() {
            return Err(error);
        }

        let index = state
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::Api {
                status: 404,
                message: format!("scenario {id} not found"),
            })?;
        Ok(Self::execute(&mut state, index))
    }

    async fn run_batch(&self, city_id: Option<&str>) -> Result<BatchResult> {
        self.record(ops::RUN_BATCH);
        self.run_delay().await;
        let mut state = self.lock();
        state.last_run_city = city_id.map(str::to_string);

        let results: Vec<ScenarioResult> = (0..state.scenarios.len())
            .map(|index| Self::execute(&mut state, index))
            .collect();

        if let Some(error) = state.batch_error.clone() {
            return Err(error);
        }

        let summary = state
            .reported_summary
            .unwrap_or_else(|| BatchSummary::tally(&results));
        Ok(BatchResult { summary, results })
    }

    async fn delete_scenario(&self, id: &str) -> Result<()> {
        self.record(ops::DELETE_SCENARIO);
        let mut state = self.lock();
        let before = state.scenarios.len();
        state.scenarios.retain(|s| s.id != id);
        if state.scenarios.len() == before {
            return Err(Error::Api {
                status: 404,
                message: format!("scenario {id} not found"),
            });
        }
        Ok(())
    }
}
