use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::aggregator::LiveStreamAggregator;

/// Background refresher for a [`LiveStreamAggregator`]
///
/// Refreshes once immediately with the loading indicator, then silently
/// every poll interval. Stops when the aggregator shuts down or its last
/// owner drops it; the poller itself does not keep the aggregator alive.
pub struct StreamPoller {
    aggregator: Weak<LiveStreamAggregator>,
}

impl StreamPoller {
    /// Create a poller for an aggregator
    pub fn new(aggregator: &Arc<LiveStreamAggregator>) -> Self {
        Self {
            aggregator: Arc::downgrade(aggregator),
        }
    }

    /// Run the loop on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Poll until the aggregator's shutdown token fires
    pub async fn run(&self) {
        let Some(aggregator) = self.aggregator.upgrade() else {
            debug!("Aggregator already dropped, poller not started");
            return;
        };
        let shutdown = aggregator.shutdown_token();
        let period = aggregator.config().poll_interval;
        info!(interval_secs = period.as_secs(), "Live stream poller starting");

        aggregator.refresh(true).await;
        drop(aggregator);

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(aggregator) = self.aggregator.upgrade() else {
                        break;
                    };
                    if aggregator.is_refreshing() {
                        debug!("Refresh already in flight, skipping tick");
                        continue;
                    }
                    let outcome = aggregator.refresh(false).await;
                    debug!(?outcome, "Background live stream refresh");
                }
                _ = shutdown.cancelled() => {
                    break;
                }
            }
        }
        info!("Live stream poller stopping");
    }
}
