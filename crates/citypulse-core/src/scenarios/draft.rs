use citypulse_remote::{Expectation, NewScenario};

use crate::error::{Error, Result};

/// Form input for a new scenario, before validation
#[derive(Debug, Clone, Default)]
pub struct ScenarioDraft {
    /// Display name (required)
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Message sent to the agent (required)
    pub input_message: String,
    /// City the scenario runs against
    pub city_id: Option<String>,
    /// Raw expectation text; a leading `{` marks a structured predicate
    pub expected_outcome: Option<String>,
}

impl ScenarioDraft {
    /// Draft with the two required fields
    pub fn new(name: impl Into<String>, input_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_message: input_message.into(),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the city
    pub fn with_city(mut self, city_id: impl Into<String>) -> Self {
        self.city_id = Some(city_id.into());
        self
    }

    /// Set the raw expectation
    pub fn with_expectation(mut self, expectation: impl Into<String>) -> Self {
        self.expected_outcome = Some(expectation.into());
        self
    }

    /// Validate and convert to the wire request.
    ///
    /// The name is trimmed; the input message is sent exactly as typed.
    ///
    /// The expectation is parsed here, once; a malformed structured predicate
    /// degrades to text matching instead of failing.
    pub fn into_request(self) -> Result<NewScenario> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("scenario name is required".to_string()));
        }
        if self.input_message.trim().is_empty() {
            return Err(Error::Validation(
                "scenario input message is required".to_string(),
            ));
        }

        Ok(NewScenario {
            name: name.to_string(),
            description: non_blank(self.description),
            input_message: self.input_message,
            city_id: non_blank(self.city_id),
            expected_outcome: self.expected_outcome.as_deref().and_then(Expectation::parse),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Caller's answer to "really delete?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Go ahead
    Confirmed,
    /// Do not delete
    Declined,
}

impl Confirmation {
    /// `Confirmed` when `yes` is true
    pub fn from_flag(yes: bool) -> Self {
        if yes {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}
