//! CityPulse Remote - backend service boundary
//!
//! This crate is the only place that knows how the dashboard backend is
//! reached:
//! - Client: the [`RemoteClient`] trait every core component depends on
//! - Types: city registry, zone processing, cost and live-stream payloads
//! - Scenario: scenario records, expectations and the reference classifier
//! - Http: reqwest-backed implementation
//! - Mock: scripted implementation for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod scenario;
pub mod types;

pub use client::RemoteClient;
pub use error::{Error, Result};
pub use http::{HttpClientConfig, HttpRemoteClient};
pub use mock::MockRemoteClient;
pub use scenario::{
    evaluate, AgentReply, BatchResult, BatchSummary, Evaluation, Expectation,
    ExpectationPredicate, NewScenario, ScenarioOutcome, ScenarioRecord, ScenarioResult,
};
pub use types::{
    CityList, CityRecord, CostBreakdown, CurrentCity, ProcessZonesResponse, RawStreamSnapshot,
    SelectCityResponse, StreamRecord, ZonesSummary,
};
