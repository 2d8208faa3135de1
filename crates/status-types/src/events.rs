//! Event types for status publishing
//!
//! Events describe what a sync pass changed on a status record. They are a
//! side channel for operators; aggregation correctness never depends on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::condition::{Category, ConditionStatus};
use crate::record::ConditionTransition;

/// Envelope wrapping all status events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEventEnvelope {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Name of the record the event concerns
    pub record: String,

    /// Event severity
    pub severity: EventSeverity,

    /// The actual event
    pub event: StatusEvent,
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Informational event
    Info,
    /// Something moved away from its healthy state
    Warning,
}

/// Status events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// Record was written for the first time
    RecordCreated { name: String },

    /// A composite condition changed status
    ConditionChanged {
        category: Category,
        from: Option<ConditionStatus>,
        to: ConditionStatus,
        reason: String,
    },

    /// A composite condition is no longer reported
    ConditionRemoved { category: Category },

    /// Related-object list changed
    RelatedObjectsChanged { count: usize },
}

impl From<ConditionTransition> for StatusEvent {
    fn from(transition: ConditionTransition) -> Self {
        StatusEvent::ConditionChanged {
            category: transition.category,
            from: transition.from,
            to: transition.to,
            reason: transition.reason,
        }
    }
}

impl StatusEventEnvelope {
    /// Create a new event envelope
    pub fn new(record: impl Into<String>, event: StatusEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            record: record.into(),
            severity: Self::infer_severity(&event),
            event,
        }
    }

    /// Override the timestamp, e.g. with the pass time of a sync
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Infer severity from event type
    fn infer_severity(event: &StatusEvent) -> EventSeverity {
        match event {
            StatusEvent::ConditionChanged { category, to, .. }
                if *to != category.healthy_status() =>
            {
                EventSeverity::Warning
            }
            _ => EventSeverity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category_polarity() {
        let degraded = StatusEventEnvelope::new(
            "operator",
            StatusEvent::ConditionChanged {
                category: Category::Degraded,
                from: Some(ConditionStatus::False),
                to: ConditionStatus::True,
                reason: "TypeA".to_string(),
            },
        );
        assert_eq!(degraded.severity, EventSeverity::Warning);

        let available = StatusEventEnvelope::new(
            "operator",
            StatusEvent::ConditionChanged {
                category: Category::Available,
                from: None,
                to: ConditionStatus::True,
                reason: "AsExpected".to_string(),
            },
        );
        assert_eq!(available.severity, EventSeverity::Info);

        let unknown = StatusEventEnvelope::new(
            "operator",
            StatusEvent::ConditionChanged {
                category: Category::Available,
                from: Some(ConditionStatus::True),
                to: ConditionStatus::Unknown,
                reason: "TypeB".to_string(),
            },
        );
        assert_eq!(unknown.severity, EventSeverity::Warning);
    }

    #[test]
    fn test_transition_into_event() {
        let event: StatusEvent = ConditionTransition {
            category: Category::Progressing,
            from: None,
            to: ConditionStatus::True,
            reason: "TypeA".to_string(),
        }
        .into();

        assert!(matches!(
            event,
            StatusEvent::ConditionChanged { category: Category::Progressing, from: None, .. }
        ));
    }
}
