use citypulse_remote::ZonesSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationStep {
    /// Nothing started
    #[default]
    Idle,
    /// Waiting for the registry to accept the city
    Selecting,
    /// Zone processing running
    Processing,
    /// EIA ingestion running
    Eia,
    /// Activation finished
    Complete,
    /// Activation stopped on an error
    Failed,
}

impl ActivationStep {
    /// A remote call for this run is outstanding
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Selecting | Self::Processing | Self::Eia)
    }

    /// Steps at which a confirmed city selection exists
    #[must_use]
    pub fn has_selection(self) -> bool {
        matches!(self, Self::Processing | Self::Eia | Self::Complete)
    }
}

impl fmt::Display for ActivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::Processing => "processing",
            Self::Eia => "eia",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// City confirmed by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCity {
    /// City identifier
    pub city_id: String,
    /// Display name
    pub name: String,
}

/// Why a run ended in [`ActivationStep::Failed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Registry answered with `success: false`
    SelectionRejected,
    /// Select call raised (transport or server error)
    SelectionFailed,
    /// Zone processing raised
    ZoneProcessingFailed,
}

/// Pipeline working state
///
/// `selected_city` is `Some` exactly when the step is processing, eia or
/// complete; `zones_summary` only from eia onward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationState {
    /// Current step
    pub step: ActivationStep,
    /// Confirmed city
    pub selected_city: Option<SelectedCity>,
    /// Zone processing result
    pub zones_summary: Option<ZonesSummary>,
    /// Human-readable failure message
    pub error: Option<String>,
    /// Failure category
    pub failure: Option<FailureKind>,
}

impl ActivationState {
    pub(crate) fn begin(&mut self) {
        *self = Self {
            step: ActivationStep::Selecting,
            ..Self::default()
        };
    }

    pub(crate) fn fail(&mut self, kind: FailureKind, message: String) {
        *self = Self {
            step: ActivationStep::Failed,
            error: Some(message),
            failure: Some(kind),
            ..Self::default()
        };
    }

    /// Whether the fields agree with the step
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let summary_ok = self.zones_summary.is_none()
            || matches!(self.step, ActivationStep::Eia | ActivationStep::Complete);
        self.selected_city.is_some() == self.step.has_selection() && summary_ok
    }
}
