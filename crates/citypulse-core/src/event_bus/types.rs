use citypulse_remote::ZonesSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named bus topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusTopic {
    /// The active city changed
    ActiveCityChanged,
    /// A city finished zone processing
    CityProcessed,
    /// Some screen asked for the city selection UI
    OpenCitySelector,
}

impl BusTopic {
    /// Wire name of the topic
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveCityChanged => "active-city-changed",
            Self::CityProcessed => "city-processed",
            Self::OpenCitySelector => "open-city-selector",
        }
    }
}

impl fmt::Display for BusTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events carried on the bus. Payloads are copies; nothing is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "kebab-case")]
pub enum BusEvent {
    /// The active city changed
    ActiveCityChanged {
        /// City identifier
        #[serde(rename = "cityId")]
        city_id: String,
        /// Display name
        name: String,
    },
    /// Zone processing for a city completed
    CityProcessed {
        /// City identifier
        #[serde(rename = "cityId")]
        city_id: String,
        /// Processing summary
        summary: ZonesSummary,
    },
    /// Request to open the city selector
    OpenCitySelector,
}

impl BusEvent {
    /// Topic this event is delivered on
    #[must_use]
    pub fn topic(&self) -> BusTopic {
        match self {
            Self::ActiveCityChanged { .. } => BusTopic::ActiveCityChanged,
            Self::CityProcessed { .. } => BusTopic::CityProcessed,
            Self::OpenCitySelector => BusTopic::OpenCitySelector,
        }
    }

    /// City the event refers to, if any
    #[must_use]
    pub fn city_id(&self) -> Option<&str> {
        match self {
            Self::ActiveCityChanged { city_id, .. } | Self::CityProcessed { city_id, .. } => {
                Some(city_id)
            }
            Self::OpenCitySelector => None,
        }
    }
}
