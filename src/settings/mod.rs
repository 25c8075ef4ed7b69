//! Application configuration
//!
//! Typed sections deserialized by [`loader::load_config`].

mod loader;

pub use loader::load_config;

use citypulse_core::StreamConfig;
use citypulse_remote::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteSettings,
    pub stream: StreamSettings,
    pub storage: StorageSettings,
    pub event_bus: EventBusSettings,
}

/// Backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: citypulse_remote::http::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: citypulse_remote::http::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RemoteSettings {
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig::new()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

/// Live stream aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub record_limit: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            timeout_secs: citypulse_core::stream::DEFAULT_STREAM_TIMEOUT_SECS,
            poll_interval_secs: citypulse_core::stream::DEFAULT_POLL_INTERVAL_SECS,
            record_limit: citypulse_core::stream::DEFAULT_RECORD_LIMIT,
        }
    }
}

impl StreamSettings {
    pub fn to_stream_config(&self) -> StreamConfig {
        StreamConfig::new()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_record_limit(self.record_limit)
    }
}

/// Active-city persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Durable tier file; platform data dir when unset
    pub durable_path: Option<PathBuf>,
}

/// Event bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusSettings {
    pub capacity: usize,
}

impl Default for EventBusSettings {
    fn default() -> Self {
        Self {
            capacity: citypulse_core::event_bus::bus::DEFAULT_CAPACITY,
        }
    }
}
