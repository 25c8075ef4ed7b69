use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The fixed set of live-stream topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamTopic {
    /// Air-quality readings
    AqiStream,
    /// Traffic speed events
    TrafficFlow,
    /// Grid power demand
    PowerDemand,
    /// Weather observations
    WeatherObs,
    /// City alerts
    CityAlerts,
}

impl StreamTopic {
    /// Every topic, in display order
    pub const ALL: [StreamTopic; 5] = [
        StreamTopic::AqiStream,
        StreamTopic::TrafficFlow,
        StreamTopic::PowerDemand,
        StreamTopic::WeatherObs,
        StreamTopic::CityAlerts,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AqiStream => "aqi_stream",
            Self::TrafficFlow => "traffic_flow",
            Self::PowerDemand => "power_demand",
            Self::WeatherObs => "weather_obs",
            Self::CityAlerts => "city_alerts",
        }
    }

    /// Topic for a wire name; unknown names are `None`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for StreamTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse "time since ingestion"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    /// Under a minute
    Seconds(i64),
    /// Under an hour
    Minutes(i64),
    /// An hour or more
    Hours(i64),
}

impl AgeBucket {
    /// Bucket the gap between ingestion and `now`. Future timestamps count
    /// as zero seconds.
    pub fn since(ingested_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (now - ingested_at).num_seconds().max(0);
        if secs < 60 {
            Self::Seconds(secs)
        } else if secs < 3600 {
            Self::Minutes(secs / 60)
        } else {
            Self::Hours(secs / 3600)
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(n) => write!(f, "{}s ago", n),
            Self::Minutes(n) => write!(f, "{}m ago", n),
            Self::Hours(n) => write!(f, "{}h ago", n),
        }
    }
}

/// One-line summary of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Headline {
    /// A single labelled reading
    Metric {
        /// What the value is
        label: &'static str,
        /// Formatted value with unit
        value: String,
    },
    /// Active alerts
    Alerts {
        /// Number of alerts
        count: usize,
        /// Title of the first alert
        first: Option<String>,
    },
    /// Alerts topic alive with nothing to report
    Heartbeat,
    /// Payload lacks the field the topic headlines on
    Unavailable,
}

impl fmt::Display for Headline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric { label, value } => write!(f, "{} {}", label, value),
            Self::Alerts { count, first } => {
                write!(f, "{} active alert(s)", count)?;
                if let Some(first) = first {
                    write!(f, ": {}", first)?;
                }
                Ok(())
            }
            Self::Heartbeat => f.write_str("No active alerts"),
            Self::Unavailable => f.write_str("n/a"),
        }
    }
}

/// Headline for a record's payload
pub fn headline(topic: StreamTopic, payload: &Value) -> Headline {
    match topic {
        StreamTopic::AqiStream => metric(payload, &["aqi", "index"], "AQI", ""),
        StreamTopic::TrafficFlow => metric(
            payload,
            &["currentSpeed", "current_speed", "speed"],
            "Speed",
            " mph",
        ),
        StreamTopic::PowerDemand => metric(payload, &["demandMw", "demand_mw"], "Demand", " MW"),
        StreamTopic::WeatherObs => metric(
            payload,
            &["temperature", "tempC", "temp_c"],
            "Temp",
            "°C",
        ),
        StreamTopic::CityAlerts => alerts(payload),
    }
}

fn metric(payload: &Value, keys: &[&str], label: &'static str, unit: &str) -> Headline {
    match number_field(payload, keys) {
        Some(value) => Headline::Metric {
            label,
            value: format!("{}{}", format_number(value), unit),
        },
        None => Headline::Unavailable,
    }
}

fn alerts(payload: &Value) -> Headline {
    let Some(list) = payload.get("alerts").and_then(Value::as_array) else {
        return Headline::Unavailable;
    };
    if list.is_empty() {
        return Headline::Heartbeat;
    }

    let first = list.first().and_then(|alert| match alert {
        Value::String(s) => Some(s.clone()),
        other => ["title", "headline", "event"]
            .iter()
            .find_map(|k| other.get(*k).and_then(Value::as_str))
            .map(str::to_string),
    });
    Headline::Alerts {
        count: list.len(),
        first,
    }
}

fn number_field(payload: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match payload.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
