//! In-memory collaborators for tests and embedded use.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use status_types::{SourceCondition, StatusEventEnvelope, StatusRecord};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::ports::{ConditionSource, EventSink, StatusSink};
use crate::error::{StatusError, StatusResult};

/// Condition source backed by a replaceable snapshot.
#[derive(Debug, Default)]
pub struct InMemoryConditionSource {
    conditions: RwLock<Vec<SourceCondition>>,
}

impl InMemoryConditionSource {
    pub fn new(conditions: Vec<SourceCondition>) -> Self {
        Self {
            conditions: RwLock::new(conditions),
        }
    }

    /// Replace the snapshot returned by subsequent reads.
    pub async fn set_conditions(&self, conditions: Vec<SourceCondition>) {
        *self.conditions.write().await = conditions;
    }
}

#[async_trait]
impl ConditionSource for InMemoryConditionSource {
    async fn current_conditions(&self) -> StatusResult<Vec<SourceCondition>> {
        Ok(self.conditions.read().await.clone())
    }
}

/// Condition source that always fails.
#[derive(Debug, Default)]
pub struct UnavailableConditionSource;

#[async_trait]
impl ConditionSource for UnavailableConditionSource {
    async fn current_conditions(&self) -> StatusResult<Vec<SourceCondition>> {
        Err(StatusError::SourceUnavailable(
            "simulated source outage".to_string(),
        ))
    }
}

/// Status sink with compare-and-swap semantics.
///
/// Conflicts can be injected to simulate concurrent writers: each injected
/// conflict bumps the stored version before rejecting the write, exactly as
/// if another writer had got there first.
#[derive(Debug, Default)]
pub struct InMemoryStatusSink {
    records: DashMap<String, StatusRecord>,
    pending_conflicts: AtomicU32,
    writes: AtomicU32,
}

impl InMemoryStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` updates with a conflict.
    pub fn with_conflicts(count: u32) -> Self {
        let sink = Self::default();
        sink.pending_conflicts.store(count, Ordering::SeqCst);
        sink
    }

    /// Store a record directly, bypassing version checks.
    pub fn seed(&self, mut record: StatusRecord) {
        record.resource_version = record.resource_version.max(1);
        self.records.insert(record.name.clone(), record);
    }

    /// Current stored copy of a record.
    pub fn snapshot(&self, name: &str) -> Option<StatusRecord> {
        self.records.get(name).map(|r| r.clone())
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    fn take_injected_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl StatusSink for InMemoryStatusSink {
    async fn get(&self, name: &str) -> StatusResult<Option<StatusRecord>> {
        Ok(self.snapshot(name))
    }

    async fn create(&self, mut record: StatusRecord) -> StatusResult<StatusRecord> {
        match self.records.entry(record.name.clone()) {
            Entry::Occupied(_) => Err(StatusError::AlreadyExists(record.name)),
            Entry::Vacant(slot) => {
                record.resource_version = 1;
                slot.insert(record.clone());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(record)
            }
        }
    }

    async fn update(&self, mut record: StatusRecord) -> StatusResult<StatusRecord> {
        let mut stored = self
            .records
            .get_mut(&record.name)
            .ok_or_else(|| StatusError::RecordNotFound(record.name.clone()))?;

        if self.take_injected_conflict() {
            stored.resource_version += 1;
            debug!(record = %record.name, "Injected write conflict");
        }

        if stored.resource_version != record.resource_version {
            return Err(StatusError::Conflict {
                name: record.name,
                expected: record.resource_version,
                actual: stored.resource_version,
            });
        }

        record.resource_version += 1;
        *stored = record.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }
}

/// Event sink that fans events out over a broadcast channel.
#[derive(Debug)]
pub struct BroadcastEventSink {
    event_tx: broadcast::Sender<StatusEventEnvelope>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self { event_tx }
    }

    /// Subscribe to status events.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEventEnvelope> {
        self.event_tx.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventSink for BroadcastEventSink {
    fn record(&self, event: StatusEventEnvelope) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

/// Event sink that drops everything.
#[derive(Debug, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn record(&self, _event: StatusEventEnvelope) {}
}
