use chrono::{DateTime, Utc};
use citypulse_remote::RemoteClient;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::snapshot::StreamSnapshot;
use crate::error::Error;

/// Wall-clock budget for one snapshot fetch
pub const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 15;

/// Period between background refreshes
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 45;

/// Records kept per topic
pub const DEFAULT_RECORD_LIMIT: usize = 20;

/// Aggregator configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Budget for one fetch
    pub timeout: Duration,
    /// Background refresh period
    pub poll_interval: Duration,
    /// Records kept per topic
    pub record_limit: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_STREAM_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            record_limit: DEFAULT_RECORD_LIMIT,
        }
    }
}

impl StreamConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetch budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the refresh period
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-topic record cap
    pub fn with_record_limit(mut self, limit: usize) -> Self {
        self.record_limit = limit;
        self
    }
}

/// What the view renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatorState {
    /// Last applied snapshot
    pub snapshot: StreamSnapshot,
    /// Failure of the last refresh
    pub error: Option<String>,
    /// A foreground refresh is running
    pub loading: bool,
    /// When the last refresh settled
    pub last_refresh: Option<DateTime<Utc>>,
}

/// How a refresh ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Healthy snapshot applied
    Updated,
    /// Snapshot applied but the backend flagged it not ok
    Degraded,
    /// Fetch failed; previous snapshot kept, error set
    Failed,
    /// Budget elapsed; error state applied
    TimedOut,
    /// Aggregator torn down; result dropped
    Discarded,
}

/// Live-stream aggregator
///
/// Each [`refresh`] awaits one fetch raced against the budget. Concurrent
/// refreshes are not coalesced here; whichever resolves last writes last.
/// After [`shutdown`] nothing is applied, including fetches already in
/// flight.
///
/// [`refresh`]: LiveStreamAggregator::refresh
/// [`shutdown`]: LiveStreamAggregator::shutdown
pub struct LiveStreamAggregator {
    client: Arc<dyn RemoteClient>,
    config: StreamConfig,
    state: watch::Sender<AggregatorState>,
    in_flight: AtomicUsize,
    shutdown: CancellationToken,
}

impl LiveStreamAggregator {
    /// Create an aggregator with an empty snapshot
    pub fn new(client: Arc<dyn RemoteClient>, config: StreamConfig) -> Self {
        let (state, _) = watch::channel(AggregatorState::default());
        Self {
            client,
            config,
            state,
            in_flight: AtomicUsize::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AggregatorState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every applied state
    pub fn subscribe(&self) -> watch::Receiver<AggregatorState> {
        self.state.subscribe()
    }

    /// A fetch is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Token cancelled by [`shutdown`](Self::shutdown)
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether the aggregator was torn down
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Tear down: stop pollers and drop any in-flight result
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Live stream aggregator shutting down");
            self.shutdown.cancel();
        }
    }

    /// Fetch one snapshot and apply it.
    ///
    /// `use_loading_indicator` marks the state as loading for the duration
    /// (foreground refreshes); background refreshes leave it alone.
    pub async fn refresh(&self, use_loading_indicator: bool) -> RefreshOutcome {
        if self.shutdown.is_cancelled() {
            return RefreshOutcome::Discarded;
        }
        let _guard = InFlight::enter(self, use_loading_indicator);
        let fetch = self.client.get_live_stream(self.config.record_limit);
        // Losing the race drops the fetch future; the request itself is
        // abandoned, not observed.
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            r = tokio::time::timeout(self.config.timeout, fetch) => Some(r),
        };

        let Some(result) = result else {
            debug!("Discarding live stream fetch after shutdown");
            return RefreshOutcome::Discarded;
        };

        let now = Utc::now();
        match result {
            Err(_elapsed) => {
                let err = Error::Timeout {
                    operation: "live stream refresh",
                    budget: self.config.timeout,
                };
                warn!(error = %err, "Live stream refresh timed out");
                self.state.send_modify(|s| {
                    s.snapshot = StreamSnapshot::failed();
                    s.error = Some(err.to_string());
                    s.loading = false;
                    s.last_refresh = Some(now);
                });
                RefreshOutcome::TimedOut
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Live stream refresh failed");
                let err = Error::from(e);
                self.state.send_modify(|s| {
                    s.error = Some(err.to_string());
                    s.loading = false;
                    s.last_refresh = Some(now);
                });
                RefreshOutcome::Failed
            }
            Ok(Ok(raw)) => {
                let snapshot = StreamSnapshot::merge(raw, self.config.record_limit);
                let healthy = snapshot.ok;
                debug!(
                    ok = healthy,
                    records = snapshot.total_records(),
                    "Live stream snapshot applied"
                );
                self.state.send_modify(|s| {
                    s.snapshot = snapshot;
                    s.error = (!healthy)
                        .then(|| "live stream backend reported an unhealthy snapshot".to_string());
                    s.loading = false;
                    s.last_refresh = Some(now);
                });
                if healthy {
                    RefreshOutcome::Updated
                } else {
                    RefreshOutcome::Degraded
                }
            }
        }
    }
}

/// Marks one refresh as outstanding until dropped, including when the
/// caller abandons the refresh future mid-fetch.
struct InFlight<'a> {
    aggregator: &'a LiveStreamAggregator,
    loading: bool,
}

impl<'a> InFlight<'a> {
    fn enter(aggregator: &'a LiveStreamAggregator, loading: bool) -> Self {
        if loading {
            aggregator.state.send_modify(|s| s.loading = true);
        }
        aggregator.in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            aggregator,
            loading,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.aggregator.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.loading {
            self.aggregator
                .state
                .send_if_modified(|s| std::mem::replace(&mut s.loading, false));
        }
    }
}

impl Drop for LiveStreamAggregator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
