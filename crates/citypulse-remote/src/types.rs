//! Wire types for the city registry, zone backend, cost and live-stream endpoints
//!
//! All payloads use camelCase JSON. Optional or loosely-populated fields carry
//! `#[serde(default)]` so a sparse backend response still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// City registry
// ============================================================================

/// A city known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    /// Stable identifier (e.g. `nyc`)
    #[serde(alias = "cityId")]
    pub id: String,
    /// Display name
    pub name: String,
    /// State / province / region
    #[serde(default)]
    pub region: String,
    /// Country
    #[serde(default)]
    pub country: String,
    /// Population, when the registry knows it
    #[serde(default)]
    pub population: Option<u64>,
}

impl CityRecord {
    /// Create a city record
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
        population: Option<u64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: region.into(),
            country: country.into(),
            population,
        }
    }
}

/// `GET /api/cities` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityList {
    /// Registered cities
    #[serde(default)]
    pub cities: Vec<CityRecord>,
}

/// `POST /api/cities/select` response
///
/// `success` is optional: only an explicit `false` is a rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCityResponse {
    /// Explicit success flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Rejection reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Selected city identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    /// Selected city display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SelectCityResponse {
    /// Accepted selection
    pub fn accepted(city_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            error: None,
            city_id: Some(city_id.into()),
            name: Some(name.into()),
        }
    }

    /// Rejected selection
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(reason.into()),
            city_id: None,
            name: None,
        }
    }

    /// True only when the success flag is present and false
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }
}

/// `GET /api/cities/current` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCity {
    /// Active city identifier
    pub city_id: String,
    /// Active city display name
    #[serde(default)]
    pub name: String,
}

// ============================================================================
// Zone processing
// ============================================================================

/// Outcome counts of processing every zone of a city
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonesSummary {
    /// Zones processed successfully
    #[serde(default)]
    pub successful: u32,
    /// Zones attempted
    #[serde(default)]
    pub total: u32,
    /// Backend-specific extras (timings, per-source counts, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ZonesSummary {
    /// Summary with no extras
    #[must_use]
    pub fn new(successful: u32, total: u32) -> Self {
        Self {
            successful,
            total,
            extra: serde_json::Map::new(),
        }
    }

    /// Zones that did not process
    #[must_use]
    pub fn failed(&self) -> u32 {
        self.total.saturating_sub(self.successful)
    }
}

/// `POST /api/zones/process-all` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessZonesResponse {
    /// Processing summary
    #[serde(default)]
    pub summary: ZonesSummary,
}

// ============================================================================
// Costs
// ============================================================================

/// `GET /api/costs` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostBreakdown {
    /// Energy cost (USD)
    pub energy_usd: f64,
    /// CO2 cost (USD)
    pub co2_usd: f64,
    /// Air-quality health cost (USD)
    pub aqi_usd: f64,
    /// Incident cost (USD)
    pub incident_usd: f64,
    /// Sum of all components (USD)
    pub total_usd: f64,
    /// Electricity price (USD per kWh)
    pub price_per_kwh: f64,
    /// Energy consumed (kWh)
    pub total_kwh: f64,
    /// Number of incidents counted
    pub incident_count: u32,
    /// Pricing data source
    pub source: String,
}

// ============================================================================
// Live stream
// ============================================================================

/// A single ingested live-stream event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    /// When the consumer ingested the event
    pub ingested_at: DateTime<Utc>,
    /// Topic-specific payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl StreamRecord {
    /// Create a record
    #[must_use]
    pub fn new(ingested_at: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self {
            ingested_at,
            payload,
        }
    }
}

/// `GET /api/stream/live` response, before topic normalisation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStreamSnapshot {
    /// Backend health flag
    #[serde(default)]
    pub ok: bool,
    /// Records keyed by topic name
    #[serde(default)]
    pub by_topic: HashMap<String, Vec<StreamRecord>>,
    /// When the consumer last received anything
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}
