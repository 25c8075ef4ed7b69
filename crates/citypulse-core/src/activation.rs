//! City activation
//!
//! Drives one city through select → process zones → process EIA, exposing
//! progress as a state machine:
//!
//! ```text
//! idle ──activate──▶ selecting ──ok──▶ processing ──zones done──▶ eia ──settled──▶ complete
//!                        │                  │
//!                        └──────failure─────┴──────────────────▶ failed
//! ```
//!
//! The EIA stage is best-effort: its failure is logged and the run still
//! completes. On completion two bus events announce the new active city and
//! its zone summary. Persisting the choice is a separate
//! [`ActivationPipeline::finalize_selection`] step.

mod catalog;
mod pipeline;
mod state;

pub use catalog::{fallback_catalog, load_catalog, Catalog, CatalogSource};
pub use pipeline::ActivationPipeline;
pub use state::{ActivationState, ActivationStep, FailureKind, SelectedCity};

#[cfg(test)]
mod tests;
