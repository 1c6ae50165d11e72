//! [`TopicQueue`] -- the in-memory exploration queue.
//!
//! A queue is loaded once per invocation, mutated, and saved at the end.
//! Every mutation goes through this type so the invariants hold:
//!
//! - canonical keys are unique for the queue's whole lifetime, whatever the
//!   state of the earlier topic;
//! - states only move `pending -> done` or `pending -> skipped`;
//! - `order` is strictly increasing and never reused.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use explain_core::{DiffRange, NormalizedTopic, Topic, TopicKind, TopicState};

use crate::error::{QueueError, Result};
use crate::traits::QueueStorage;

/// Per-state topic counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub pending: usize,
    pub done: usize,
    pub skipped: usize,
}

impl QueueCounts {
    pub fn total(&self) -> usize {
        self.pending + self.done + self.skipped
    }
}

/// Current on-disk document.
#[derive(Debug, Deserialize)]
struct QueueDocument {
    topics: Vec<Topic>,
}

#[derive(Serialize)]
struct QueueDocumentRef<'a> {
    topics: &'a [Topic],
}

/// Record of the older bare-array format.
#[derive(Debug, Deserialize)]
struct LegacyTopic {
    #[serde(default)]
    title: String,
    kind: TopicKind,
    target: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    status: TopicState,
    #[serde(default)]
    added: String,
}

/// The exploration queue.
#[derive(Debug, Default)]
pub struct TopicQueue {
    /// Topics in ascending `order`.
    topics: Vec<Topic>,
    /// Canonical key -> position in `topics`.
    index: HashMap<String, usize>,
    next_order: u64,
    dirty: bool,
}

impl TopicQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs the queue from `storage`; an absent document yields an
    /// empty queue.
    ///
    /// A document that does not parse, holds an unknown state, or repeats a
    /// canonical key or order is reported as [`QueueError::Persistence`].
    pub fn load(storage: &dyn QueueStorage) -> Result<Self> {
        let location = storage.location();
        let Some(raw) = storage.load_raw()? else {
            debug!(%location, "starting with an empty queue");
            return Ok(Self::new());
        };
        if raw.trim().is_empty() {
            return Err(QueueError::persistence(location, "file is empty"));
        }

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| QueueError::persistence(&location, format!("invalid JSON: {e}")))?;

        let queue = match value {
            serde_json::Value::Array(_) => {
                let records: Vec<LegacyTopic> = serde_json::from_value(value)
                    .map_err(|e| QueueError::persistence(&location, format!("invalid record: {e}")))?;
                warn!(%location, records = records.len(), "loading legacy queue format");
                let mut queue = Self::from_legacy(records);
                queue.dirty = true;
                queue
            }
            serde_json::Value::Object(_) => {
                let doc: QueueDocument = serde_json::from_value(value)
                    .map_err(|e| QueueError::persistence(&location, format!("invalid record: {e}")))?;
                Self::from_topics(doc.topics).map_err(|reason| QueueError::persistence(&location, reason))?
            }
            _ => {
                return Err(QueueError::persistence(location, "expected a JSON object"));
            }
        };

        info!(%location, topics = queue.len(), next_order = queue.next_order, "queue loaded");
        Ok(queue)
    }

    /// Builds a queue from current-format records, validating invariants.
    fn from_topics(mut topics: Vec<Topic>) -> std::result::Result<Self, String> {
        topics.sort_by_key(|t| t.order);

        let mut index = HashMap::with_capacity(topics.len());
        for (pos, topic) in topics.iter().enumerate() {
            if pos > 0 && topics[pos - 1].order == topic.order {
                return Err(format!("order {} is used twice", topic.order));
            }
            if index.insert(topic.canonical_key(), pos).is_some() {
                return Err(format!("duplicate topic {}", topic.canonical_key()));
            }
        }

        let next_order = match topics.last() {
            Some(last) => last
                .order
                .checked_add(1)
                .ok_or_else(|| format!("order {} leaves no room for new topics", last.order))?,
            None => 0,
        };
        Ok(Self {
            topics,
            index,
            next_order,
            dirty: false,
        })
    }

    /// Converts legacy records, assigning order by position. Later records
    /// that collide on canonical key are dropped.
    fn from_legacy(records: Vec<LegacyTopic>) -> Self {
        let mut queue = Self::new();
        for record in records {
            let target = match record.kind {
                TopicKind::Diff => DiffRange::from_target(&record.target).to_target(),
                _ => record.target,
            };
            let topic = Topic {
                kind: record.kind,
                target,
                title: record.title,
                source_ref: Some(record.source).filter(|s| !s.is_empty()),
                state: record.status,
                order: queue.next_order,
                added_at: parse_legacy_timestamp(&record.added),
            };
            let key = topic.canonical_key();
            if queue.index.contains_key(&key) {
                warn!(%key, "dropping duplicate legacy record");
                continue;
            }
            queue.insert(key, topic);
        }
        queue
    }

    /// Persists the queue if anything changed since load. Returns whether a
    /// write happened.
    pub fn save(&mut self, storage: &dyn QueueStorage) -> Result<bool> {
        if !self.dirty {
            debug!(location = %storage.location(), "queue unchanged, not saving");
            return Ok(false);
        }
        let mut json = serde_json::to_string_pretty(&QueueDocumentRef {
            topics: &self.topics,
        })
        .map_err(|e| QueueError::persistence(storage.location(), format!("serialize: {e}")))?;
        json.push('\n');

        storage.save_raw(&json)?;
        self.dirty = false;
        info!(location = %storage.location(), topics = self.len(), "queue saved");
        Ok(true)
    }

    fn insert(&mut self, key: String, topic: Topic) {
        self.index.insert(key, self.topics.len());
        self.next_order = self.next_order.max(topic.order.saturating_add(1));
        self.topics.push(topic);
        self.dirty = true;
    }

    /// Adds `topic` unless its key was ever queued. Returns whether it was
    /// inserted; the first surfacing source is kept on duplicates.
    pub fn enqueue(&mut self, topic: NormalizedTopic, source: Option<&str>) -> bool {
        if let Some(existing) = self.get(&topic.key) {
            debug!(key = %topic.key, state = %existing.state, "topic already queued");
            return false;
        }
        // `u64::MAX` is never handed out, so every stored order has a successor.
        if self.next_order == u64::MAX {
            warn!(key = %topic.key, "order space exhausted, not queueing");
            return false;
        }
        let order = self.next_order;
        debug!(key = %topic.key, order, "enqueue");
        self.insert(
            topic.key,
            Topic {
                kind: topic.kind,
                target: topic.target,
                title: topic.title,
                source_ref: source.map(str::to_string),
                state: TopicState::Pending,
                order,
                added_at: Utc::now(),
            },
        );
        true
    }

    /// Records a seed explanation as done so it is never re-queued. An
    /// existing pending topic with the same key is completed; finished
    /// topics are left alone. Returns whether anything changed.
    pub fn record_seed(&mut self, topic: NormalizedTopic) -> bool {
        match self.get(&topic.key).map(|t| t.state) {
            Some(TopicState::Pending) => self.transition(&topic.key, TopicState::Done).is_ok(),
            Some(_) => false,
            None => {
                let key = topic.key.clone();
                self.enqueue(topic, None);
                self.transition(&key, TopicState::Done).is_ok()
            }
        }
    }

    /// Looks a topic up by canonical key.
    pub fn get(&self, key: &str) -> Option<&Topic> {
        self.index.get(key).map(|&pos| &self.topics[pos])
    }

    /// Pending topics in ascending order.
    pub fn pending(&self) -> Vec<&Topic> {
        self.all(false)
    }

    /// Topics in ascending order, optionally including finished ones.
    pub fn all(&self, include_done_skipped: bool) -> Vec<&Topic> {
        self.topics
            .iter()
            .filter(|t| include_done_skipped || t.is_pending())
            .collect()
    }

    /// The earliest pending topic. Does not change its state.
    pub fn pop_front(&self) -> Result<&Topic> {
        self.topics
            .iter()
            .find(|t| t.is_pending())
            .ok_or(QueueError::EmptyQueue)
    }

    pub fn mark_done(&mut self, key: &str) -> Result<()> {
        self.transition(key, TopicState::Done)
    }

    pub fn mark_skipped(&mut self, key: &str) -> Result<()> {
        self.transition(key, TopicState::Skipped)
    }

    fn transition(&mut self, key: &str, to: TopicState) -> Result<()> {
        let pos = *self
            .index
            .get(key)
            .ok_or_else(|| QueueError::unknown_topic(key))?;
        let topic = &mut self.topics[pos];
        if topic.state != TopicState::Pending {
            return Err(QueueError::InvalidTransition {
                key: key.to_string(),
                from: topic.state,
                to,
            });
        }
        topic.state = to;
        self.dirty = true;
        info!(%key, state = %to, "topic transitioned");
        Ok(())
    }

    pub fn counts(&self) -> QueueCounts {
        self.topics
            .iter()
            .fold(QueueCounts::default(), |mut c, t| {
                match t.state {
                    TopicState::Pending => c.pending += 1,
                    TopicState::Done => c.done += 1,
                    TopicState::Skipped => c.skipped += 1,
                }
                c
            })
    }

    /// Order the next inserted topic will get.
    pub fn next_order(&self) -> u64 {
        self.next_order
    }

    /// Returns `true` if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Legacy timestamps are local ISO-8601 without an offset.
fn parse_legacy_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|n| n.and_utc()))
        .unwrap_or_else(|_| Utc::now())
}
