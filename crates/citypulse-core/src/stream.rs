//! Live stream aggregation
//!
//! Polls the live-stream consumer for a multi-topic snapshot under a hard
//! time budget and merges it into displayable state:
//! - [`LiveStreamAggregator`]: one refresh = fetch raced against the budget
//! - [`StreamPoller`]: periodic refresh until the aggregator is torn down
//! - [`StreamSnapshot`]: fixed five-topic view, most-recent-first
//! - [`headline`] / [`AgeBucket`]: per-record display derivations
//!
//! Unlike activation, the aggregator fails loud: a timeout replaces the
//! displayed snapshot with an explicit error state.

mod aggregator;
mod poller;
mod snapshot;
mod topics;

pub use aggregator::{
    AggregatorState, LiveStreamAggregator, RefreshOutcome, StreamConfig,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_RECORD_LIMIT, DEFAULT_STREAM_TIMEOUT_SECS,
};
pub use poller::StreamPoller;
pub use snapshot::StreamSnapshot;
pub use topics::{headline, AgeBucket, Headline, StreamTopic};
