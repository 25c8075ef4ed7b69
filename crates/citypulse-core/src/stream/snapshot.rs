use chrono::{DateTime, Utc};
use citypulse_remote::{RawStreamSnapshot, StreamRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::topics::StreamTopic;

/// Live-stream view over the fixed topic set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSnapshot {
    /// Backend health flag
    pub ok: bool,
    /// Records per topic, most recent first
    pub by_topic: BTreeMap<StreamTopic, Vec<StreamRecord>>,
    /// When the consumer last received anything
    pub last_updated: Option<DateTime<Utc>>,
}

impl StreamSnapshot {
    /// Explicit error state: not ok, no topics
    #[must_use]
    pub fn failed() -> Self {
        Self::default()
    }

    /// Normalise a raw response.
    ///
    /// Every known topic is present (absent ones empty), unknown topics are
    /// dropped, records are ordered newest first and capped at `limit`.
    pub fn merge(raw: RawStreamSnapshot, limit: usize) -> Self {
        let mut by_topic: BTreeMap<StreamTopic, Vec<StreamRecord>> = StreamTopic::ALL
            .into_iter()
            .map(|topic| (topic, Vec::new()))
            .collect();

        for (name, mut records) in raw.by_topic {
            let Some(topic) = StreamTopic::from_name(&name) else {
                debug!(topic = %name, "Ignoring unknown stream topic");
                continue;
            };
            records.sort_by(|a, b| b.ingested_at.cmp(&a.ingested_at));
            records.truncate(limit);
            by_topic.insert(topic, records);
        }

        Self {
            ok: raw.ok,
            by_topic,
            last_updated: raw.last_updated,
        }
    }

    /// Records for a topic (empty when absent)
    pub fn records(&self, topic: StreamTopic) -> &[StreamRecord] {
        self.by_topic.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Newest record for a topic
    pub fn latest(&self, topic: StreamTopic) -> Option<&StreamRecord> {
        self.records(topic).first()
    }

    /// Record count per topic
    pub fn topic_counts(&self) -> BTreeMap<StreamTopic, usize> {
        self.by_topic
            .iter()
            .map(|(topic, records)| (*topic, records.len()))
            .collect()
    }

    /// Total records across topics
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.by_topic.values().map(Vec::len).sum()
    }
}
