//! Scenario types shared with the scenario-execution agent
//!
//! A scenario is an input message sent to the conversational agent plus an
//! optional [`Expectation`] used to classify the reply as
//! [`ScenarioOutcome::Pass`], [`ScenarioOutcome::Fail`] or
//! [`ScenarioOutcome::Unknown`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Prefix accepted in front of a free-text expectation (`contains: outage`)
const CONTAINS_PREFIX: &str = "contains:";

// ============================================================================
// Outcomes
// ============================================================================

/// Three-way classification of a scenario run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioOutcome {
    /// Reply met the expectation
    Pass,
    /// Reply contradicted the expectation
    Fail,
    /// No expectation, or nothing it could be checked against
    #[default]
    Unknown,
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Expectations
// ============================================================================

/// Structured expectation predicate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectationPredicate {
    /// Reply text must contain this (case-insensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    /// Reply must (or must not) include at least one action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_actions: Option<bool>,
    /// Keys the agent understands but this client does not
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Expected outcome of a scenario
///
/// Parsed once when the scenario is created; downstream code matches on the
/// variant and never re-interprets the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expectation {
    /// Substring match against the agent's reply
    Text(String),
    /// Structured predicate
    Structured(ExpectationPredicate),
}

impl Expectation {
    /// Parse user-entered expectation text.
    ///
    /// Text whose first character is `{` is tried as a structured predicate;
    /// if that fails the original text is kept verbatim as a text match.
    /// Leading whitespace means text. Blank input means "no expectation".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        if raw.starts_with('{') {
            match serde_json::from_str::<ExpectationPredicate>(raw) {
                Ok(predicate) => return Some(Self::Structured(predicate)),
                Err(e) => {
                    debug!(error = %e, "Expectation is not a valid predicate, using text match");
                }
            }
        }

        Some(Self::Text(raw.to_string()))
    }
}

/// Agent reply to a scenario input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    /// Reply text
    #[serde(default)]
    pub text: String,
    /// Actions the agent proposed or executed
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}

impl AgentReply {
    /// Text-only reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }
}

/// Classification plus an explanation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Outcome
    pub outcome: ScenarioOutcome,
    /// Human-readable reason
    pub notes: String,
}

impl Evaluation {
    fn new(outcome: ScenarioOutcome, notes: impl Into<String>) -> Self {
        Self {
            outcome,
            notes: notes.into(),
        }
    }
}

/// Classify a reply against an expectation.
///
/// This is the reference classifier the scenario agent applies. Text
/// expectations are case-insensitive substring matches (an optional
/// `contains:` prefix is stripped). Structured predicates pass only when
/// every recognised key holds. No expectation, or a predicate with no
/// recognised key, yields [`ScenarioOutcome::Unknown`].
pub fn evaluate(expectation: Option<&Expectation>, reply: &AgentReply) -> Evaluation {
    let Some(expectation) = expectation else {
        return Evaluation::new(ScenarioOutcome::Unknown, "no expectation defined");
    };

    match expectation {
        Expectation::Text(text) => {
            let needle = text_needle(text);
            if needle.is_empty() {
                return Evaluation::new(ScenarioOutcome::Unknown, "empty text expectation");
            }
            if contains_ignore_case(&reply.text, needle) {
                Evaluation::new(ScenarioOutcome::Pass, format!("reply contains '{needle}'"))
            } else {
                Evaluation::new(
                    ScenarioOutcome::Fail,
                    format!("reply does not contain '{needle}'"),
                )
            }
        }
        Expectation::Structured(predicate) => evaluate_predicate(predicate, reply),
    }
}

fn evaluate_predicate(predicate: &ExpectationPredicate, reply: &AgentReply) -> Evaluation {
    let mut checked = 0;
    let mut failures = Vec::new();

    if let Some(needle) = predicate.contains.as_deref() {
        checked += 1;
        if !contains_ignore_case(&reply.text, needle) {
            failures.push(format!("reply does not contain '{needle}'"));
        }
    }

    if let Some(expected) = predicate.has_actions {
        checked += 1;
        let actual = !reply.actions.is_empty();
        if actual != expected {
            failures.push(if expected {
                "reply has no actions".to_string()
            } else {
                format!("reply has {} unexpected action(s)", reply.actions.len())
            });
        }
    }

    if checked == 0 {
        return Evaluation::new(ScenarioOutcome::Unknown, "predicate has no checkable keys");
    }

    if failures.is_empty() {
        Evaluation::new(
            ScenarioOutcome::Pass,
            format!("{checked} predicate check(s) passed"),
        )
    } else {
        Evaluation::new(ScenarioOutcome::Fail, failures.join("; "))
    }
}

fn text_needle(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.get(..CONTAINS_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CONTAINS_PREFIX) => {
            trimmed[CONTAINS_PREFIX.len()..].trim()
        }
        _ => trimmed,
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ============================================================================
// Records
// ============================================================================

/// A stored scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    /// Backend-assigned identifier
    pub id: String,
    /// Scenario name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message sent to the agent
    pub input_message: String,
    /// City the scenario is pinned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    /// Expected outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<Expectation>,
    /// Outcome of the most recent run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_outcome: Option<ScenarioOutcome>,
    /// Time of the most recent run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
}

/// `POST /api/scenarios` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScenario {
    /// Scenario name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message sent to the agent
    pub input_message: String,
    /// City the scenario is pinned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    /// Expected outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<Expectation>,
}

/// Result of running one scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    /// Scenario identifier, when the agent echoes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    /// Scenario name
    #[serde(default)]
    pub scenario_name: String,
    /// Classification
    #[serde(default)]
    pub outcome: ScenarioOutcome,
    /// Explanation of the classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_notes: Option<String>,
    /// Agent reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<AgentReply>,
}

/// Pass/fail/unknown counts
///
/// Counts missing from a backend response decode as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSummary {
    /// Passing scenarios
    pub pass: u32,
    /// Failing scenarios
    pub fail: u32,
    /// Unclassified scenarios
    pub unknown: u32,
}

impl BatchSummary {
    /// Count the outcomes in a result list
    pub fn tally(results: &[ScenarioResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                match result.outcome {
                    ScenarioOutcome::Pass => summary.pass += 1,
                    ScenarioOutcome::Fail => summary.fail += 1,
                    ScenarioOutcome::Unknown => summary.unknown += 1,
                }
                summary
            })
    }

    /// Number of scenarios counted
    #[must_use]
    pub fn total(&self) -> u32 {
        self.pass + self.fail + self.unknown
    }
}

/// `POST /api/scenarios/run-batch` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchResult {
    /// Reported counts
    pub summary: BatchSummary,
    /// Per-scenario results in execution order
    pub results: Vec<ScenarioResult>,
}

#[cfg(test)]
mod tests;
