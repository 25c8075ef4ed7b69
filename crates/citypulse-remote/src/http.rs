//! HTTP implementation of [`RemoteClient`]
//!
//! Talks JSON over REST to the dashboard backend. Transport failures map to
//! [`Error::Network`] / [`Error::Timeout`], non-2xx responses to
//! [`Error::Api`] with the message the backend put in its body.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::client::RemoteClient;
use crate::error::{Error, Result};
use crate::scenario::{BatchResult, NewScenario, ScenarioRecord, ScenarioResult};
use crate::types::{
    CityList, CityRecord, CostBreakdown, CurrentCity, ProcessZonesResponse, RawStreamSnapshot,
    SelectCityResponse,
};

/// Default backend URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the backend URL
pub const ENV_API_URL: &str = "CITYPULSE_API_URL";

/// Longest error body echoed back to callers
const MAX_ERROR_BODY_LEN: usize = 200;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CityRequest<'a> {
    city_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    city_id: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScenarioList {
    #[serde(default)]
    scenarios: Vec<ScenarioRecord>,
}

// ============================================================================
// Client Implementation
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Backend base URL (default: http://localhost:8000)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::default().with_base_url(base_url)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed remote client
pub struct HttpRemoteClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpRemoteClient {
    /// Create a new client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::NotConfigured("base URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::NotConfigured(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(HttpClientConfig::from_env())
    }

    /// Active configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.config.timeout.as_millis() as u64)
        } else if e.is_connect() {
            Error::Network(format!(
                "failed to connect to {}: {}",
                self.config.base_url, e
            ))
        } else {
            Error::Network(e.to_string())
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: extract_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::decode(response).await
    }

    async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::decode(response).await
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn list_cities(&self) -> Result<Vec<CityRecord>> {
        let list: CityList = self.get_json("/api/cities").await?;
        Ok(list.cities)
    }

    #[instrument(skip(self))]
    async fn select_city(&self, city_id: &str) -> Result<SelectCityResponse> {
        self.post_json("/api/cities/select", &CityRequest { city_id })
            .await
    }

    #[instrument(skip(self))]
    async fn process_all_zones(&self, city_id: &str) -> Result<ProcessZonesResponse> {
        self.post_json("/api/zones/process-all", &CityRequest { city_id })
            .await
    }

    #[instrument(skip(self))]
    async fn process_eia(&self, city_id: &str) -> Result<serde_json::Value> {
        self.post_json("/api/eia/process", &CityRequest { city_id })
            .await
    }

    #[instrument(skip(self))]
    async fn get_current_city(&self) -> Result<CurrentCity> {
        self.get_json("/api/cities/current").await
    }

    #[instrument(skip(self))]
    async fn get_costs(&self, city_id: &str) -> Result<CostBreakdown> {
        self.get_json_query("/api/costs", &[("cityId", city_id.to_string())])
            .await
    }

    #[instrument(skip(self))]
    async fn get_live_stream(&self, limit: usize) -> Result<RawStreamSnapshot> {
        self.get_json_query("/api/stream/live", &[("limit", limit.to_string())])
            .await
    }

    #[instrument(skip(self))]
    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>> {
        let list: ScenarioList = self.get_json("/api/scenarios").await?;
        Ok(list.scenarios)
    }

    #[instrument(skip(self, scenario), fields(name = %scenario.name))]
    async fn create_scenario(&self, scenario: &NewScenario) -> Result<ScenarioRecord> {
        self.post_json("/api/scenarios", scenario).await
    }

    #[instrument(skip(self))]
    async fn run_scenario(&self, id: &str, city_id: Option<&str>) -> Result<ScenarioResult> {
        self.post_json(&scenario_path(id, "/run"), &RunRequest { city_id })
            .await
    }

    #[instrument(skip(self))]
    async fn run_batch(&self, city_id: Option<&str>) -> Result<BatchResult> {
        self.post_json("/api/scenarios/run-batch", &RunRequest { city_id })
            .await
    }

    #[instrument(skip(self))]
    async fn delete_scenario(&self, id: &str) -> Result<()> {
        let url = self.url(&scenario_path(id, ""));
        debug!(%url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response).await?;
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn scenario_path(id: &str, suffix: &str) -> String {
    // ids are backend-assigned; keep a stray slash from escaping the route
    format!("/api/scenarios/{}{}", id.replace('/', "%2F"), suffix)
}

/// Pull a readable message out of an error body (`{"error": ..}` or
/// `{"message": ..}`), falling back to a truncated raw body.
fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(trimmed) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            return Some(msg);
        }
    }

    Some(trimmed.chars().take(MAX_ERROR_BODY_LEN).collect())
}
