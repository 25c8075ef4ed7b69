//! CityPulse Core - Dashboard Orchestration
//!
//! This crate holds the client-side orchestration of the CityPulse dashboard,
//! including:
//! - Event bus: typed publish/subscribe between components
//! - Storage: session and durable tiers for the active city
//! - Context: per-call resolution of the active city
//! - Activation: select → process zones → process EIA pipeline
//! - Stream: live-stream aggregation under a hard time budget
//! - Scenarios: agent scenario runs and batch summaries
//! - Costs: cost breakdown that follows city activation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod activation;
pub mod context;
pub mod costs;
pub mod error;
pub mod event_bus;
pub mod scenarios;
pub mod storage;
pub mod stream;

pub use activation::{
    fallback_catalog, load_catalog, ActivationPipeline, ActivationState, ActivationStep, Catalog,
    CatalogSource, FailureKind, SelectedCity,
};
pub use context::CityContext;
pub use costs::{CostObserver, CostState};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use event_bus::{BusEvent, BusTopic, EventBus, Subscription};
pub use scenarios::{Confirmation, ScenarioBoard, ScenarioDraft, ScenarioRunner};
pub use storage::{ActiveCityStore, DurableStore, KeyValueStore, PersistOutcome, SessionStore};
pub use stream::{
    headline, AgeBucket, AggregatorState, Headline, LiveStreamAggregator, RefreshOutcome,
    StreamConfig, StreamPoller, StreamSnapshot, StreamTopic,
};
