//! Status syncer: one reconciliation pass from source conditions to the
//! persisted status record.
//!
//! A pass reads the current conditions and record, recomputes every
//! composite, merges them and the reconciled related objects into a copy of
//! the record, and writes it back only if something changed. Writes that
//! lose an optimistic-concurrency race are retried from a fresh read.

mod memory;
mod ports;

pub use memory::{
    BroadcastEventSink, InMemoryConditionSource, InMemoryStatusSink, NoOpEventSink,
    UnavailableConditionSource,
};
pub use ports::{ConditionSource, EventSink, StatusSink};

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use status_types::{
    EventSeverity, ObjectReference, SourceCondition, StatusEvent, StatusEventEnvelope,
    StatusRecord,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::Aggregator;
use crate::config::StatusConfig;
use crate::error::{StatusError, StatusResult};
use crate::inertia::InertiaPolicy;
use crate::related::{reconcile_related_objects, same_set, DynamicRelatedObjects, RelatedObjectsSource};

/// Everything a syncer needs, assembled once before it runs.
#[derive(Clone)]
pub struct SyncerSettings {
    /// Record to publish into.
    pub record_name: String,

    /// Inertia for the Degraded category.
    pub policy: Arc<InertiaPolicy>,

    /// Related objects that are always reported.
    pub static_related_objects: Vec<ObjectReference>,

    /// Optional dynamic related-object supplier.
    pub related_objects_source: Option<Arc<dyn RelatedObjectsSource>>,

    /// Conflict retries after the first write attempt.
    pub max_conflict_retries: u32,

    /// Emit status events on transitions.
    pub emit_events: bool,
}

impl SyncerSettings {
    /// Settings with defaults for everything but the record and policy.
    pub fn new(record_name: impl Into<String>, policy: Arc<InertiaPolicy>) -> Self {
        Self {
            record_name: record_name.into(),
            policy,
            static_related_objects: Vec::new(),
            related_objects_source: None,
            max_conflict_retries: 5,
            emit_events: true,
        }
    }

    /// Build settings from configuration, compiling the inertia policy.
    pub fn from_config(
        config: &StatusConfig,
        related_objects_source: Option<Arc<dyn RelatedObjectsSource>>,
    ) -> StatusResult<Self> {
        Ok(Self {
            record_name: config.record_name.clone(),
            policy: Arc::new(config.inertia.build_policy()?),
            static_related_objects: config.related_objects.clone(),
            related_objects_source,
            max_conflict_retries: config.sync.max_conflict_retries,
            emit_events: config.sync.emit_events,
        })
    }
}

impl fmt::Debug for SyncerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncerSettings")
            .field("record_name", &self.record_name)
            .field("policy", &self.policy)
            .field("static_related_objects", &self.static_related_objects)
            .field("has_dynamic_related_objects", &self.related_objects_source.is_some())
            .field("max_conflict_retries", &self.max_conflict_retries)
            .field("emit_events", &self.emit_events)
            .finish()
    }
}

/// Result of a sync pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The stored record already matched; nothing was written.
    Unchanged(StatusRecord),

    /// The record was written.
    Updated {
        record: StatusRecord,
        events: Vec<StatusEvent>,
    },
}

impl SyncOutcome {
    pub fn record(&self) -> &StatusRecord {
        match self {
            SyncOutcome::Unchanged(record) => record,
            SyncOutcome::Updated { record, .. } => record,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

/// Desired record for one pass plus the events it implies.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub record: StatusRecord,
    pub events: Vec<StatusEvent>,
}

/// Publishes aggregated status for one record.
pub struct StatusSyncer {
    settings: SyncerSettings,
    aggregator: Aggregator,
    source: Arc<dyn ConditionSource>,
    sink: Arc<dyn StatusSink>,
    events: Arc<dyn EventSink>,

    /// At most one pass in flight per syncer.
    sync_lock: Mutex<()>,
}

impl StatusSyncer {
    pub fn new(
        settings: SyncerSettings,
        source: Arc<dyn ConditionSource>,
        sink: Arc<dyn StatusSink>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let aggregator = Aggregator::new(settings.policy.clone());
        Self {
            settings,
            aggregator,
            source,
            sink,
            events,
            sync_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &SyncerSettings {
        &self.settings
    }

    /// Run one pass at the current wall-clock time.
    pub async fn sync(&self) -> StatusResult<SyncOutcome> {
        self.sync_at(Utc::now()).await
    }

    /// Run one pass as of `now`.
    #[instrument(skip(self), fields(record = %self.settings.record_name))]
    pub async fn sync_at(&self, now: DateTime<Utc>) -> StatusResult<SyncOutcome> {
        let _guard = self.sync_lock.lock().await;

        let attempts = self.settings.max_conflict_retries.saturating_add(1);
        for attempt in 1..=attempts {
            match self.try_sync(now).await {
                Err(e) if e.is_conflict() => {
                    warn!(
                        record = %self.settings.record_name,
                        attempt = attempt,
                        error = %e,
                        "Status write conflicted, re-reading"
                    );
                }
                other => return other,
            }
        }

        Err(StatusError::RetriesExhausted {
            name: self.settings.record_name.clone(),
            attempts,
        })
    }

    /// Compute the desired record from a condition snapshot and the current record.
    pub fn plan(
        &self,
        conditions: &[SourceCondition],
        current: &StatusRecord,
        now: DateTime<Utc>,
    ) -> SyncPlan {
        let mut record = current.clone();
        let mut events = Vec::new();

        if current.is_new() {
            events.push(StatusEvent::RecordCreated {
                name: record.name.clone(),
            });
        }

        let composites = self.aggregator.aggregate(conditions, now);
        for composite in composites.values() {
            if let Some(transition) = record.set_condition(composite, now) {
                events.push(transition.into());
            }
        }
        for category in record.retain_categories(|c| composites.contains_key(&c)) {
            events.push(StatusEvent::ConditionRemoved { category });
        }

        let dynamic = DynamicRelatedObjects::from_source(self.settings.related_objects_source.as_deref());
        if dynamic == DynamicRelatedObjects::Unavailable {
            debug!(
                record = %record.name,
                "Dynamic related objects unavailable, keeping persisted list"
            );
        }
        let related = reconcile_related_objects(
            dynamic,
            &self.settings.static_related_objects,
            &current.related_objects,
        );
        if !same_set(&related, &current.related_objects) {
            events.push(StatusEvent::RelatedObjectsChanged {
                count: related.len(),
            });
            record.related_objects = related;
        }

        SyncPlan { record, events }
    }

    async fn try_sync(&self, now: DateTime<Utc>) -> StatusResult<SyncOutcome> {
        let name = &self.settings.record_name;
        let conditions = self.source.current_conditions().await?;
        let current = self.sink.get(name).await?;

        let base = current
            .clone()
            .unwrap_or_else(|| StatusRecord::new(name.clone()));
        let plan = self.plan(&conditions, &base, now);

        if current.is_some() && plan.record == base {
            debug!(record = %name, "Status unchanged");
            return Ok(SyncOutcome::Unchanged(base));
        }

        let record = match current {
            None => self.sink.create(plan.record).await?,
            Some(_) => self.sink.update(plan.record).await?,
        };

        info!(
            record = %name,
            version = record.resource_version,
            changes = plan.events.len(),
            "Status record written"
        );
        self.publish(&plan.events, now);

        Ok(SyncOutcome::Updated {
            record,
            events: plan.events,
        })
    }

    fn publish(&self, events: &[StatusEvent], now: DateTime<Utc>) {
        for event in events {
            let envelope =
                StatusEventEnvelope::new(self.settings.record_name.clone(), event.clone()).at(now);

            if let StatusEvent::ConditionChanged {
                category,
                from,
                to,
                reason,
            } = &envelope.event
            {
                match envelope.severity {
                    EventSeverity::Warning => {
                        warn!(category = %category, from = ?from, to = %to, reason = %reason, "Status condition changed")
                    }
                    EventSeverity::Info => {
                        info!(category = %category, from = ?from, to = %to, reason = %reason, "Status condition changed")
                    }
                }
            }

            if self.settings.emit_events {
                self.events.record(envelope);
            }
        }
    }
}
