//! Persisted status record
//!
//! The record is owned by the status sink; the syncer reads it, merges the
//! freshly computed composites into a copy and writes it back guarded by
//! `resource_version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::{Category, CompositeCondition, ConditionStatus};
use crate::object_ref::ObjectReference;

/// Condition as stored on the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCondition {
    pub category: Category,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

/// A status change caused by merging a composite into a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionTransition {
    pub category: Category,
    /// Previous status, `None` if the record had no such condition
    pub from: Option<ConditionStatus>,
    pub to: ConditionStatus,
    pub reason: String,
}

/// Versioned status document for one managed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Record name, unique per sink
    pub name: String,

    /// Optimistic-concurrency token; 0 means never persisted
    #[serde(default)]
    pub resource_version: u64,

    /// Conditions, one per category, in category order
    #[serde(default)]
    pub conditions: Vec<RecordCondition>,

    /// Objects related to the component
    #[serde(default)]
    pub related_objects: Vec<ObjectReference>,
}

impl StatusRecord {
    /// Create an empty, never-persisted record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_version: 0,
            conditions: Vec::new(),
            related_objects: Vec::new(),
        }
    }

    /// Whether the record has never been written to a sink.
    pub fn is_new(&self) -> bool {
        self.resource_version == 0
    }

    /// Find the stored condition for a category.
    pub fn find_condition(&self, category: Category) -> Option<&RecordCondition> {
        self.conditions.iter().find(|c| c.category == category)
    }

    /// Merge a composite into the record.
    ///
    /// The transition time is only moved when the status changes; reason and
    /// message are always refreshed. Returns the transition, if any.
    pub fn set_condition(
        &mut self,
        composite: &CompositeCondition,
        now: DateTime<Utc>,
    ) -> Option<ConditionTransition> {
        // Stored order comes from the sink and may not be sorted
        match self
            .conditions
            .iter()
            .position(|c| c.category == composite.category)
        {
            Some(idx) => {
                let existing = &mut self.conditions[idx];
                existing.reason = composite.reason.clone();
                existing.message = composite.message.clone();

                if existing.status == composite.status {
                    return None;
                }

                let from = existing.status;
                existing.status = composite.status;
                existing.last_transition_time = now;

                Some(ConditionTransition {
                    category: composite.category,
                    from: Some(from),
                    to: composite.status,
                    reason: composite.reason.clone(),
                })
            }
            None => {
                let idx = self
                    .conditions
                    .iter()
                    .position(|c| c.category > composite.category)
                    .unwrap_or(self.conditions.len());
                self.conditions.insert(
                    idx,
                    RecordCondition {
                        category: composite.category,
                        status: composite.status,
                        reason: composite.reason.clone(),
                        message: composite.message.clone(),
                        last_transition_time: composite.last_transition_time.unwrap_or(now),
                    },
                );

                Some(ConditionTransition {
                    category: composite.category,
                    from: None,
                    to: composite.status,
                    reason: composite.reason.clone(),
                })
            }
        }
    }

    /// Drop conditions whose category is not kept. Returns the removed categories.
    pub fn retain_categories(&mut self, keep: impl Fn(Category) -> bool) -> Vec<Category> {
        let removed: Vec<Category> = self
            .conditions
            .iter()
            .map(|c| c.category)
            .filter(|category| !keep(*category))
            .collect();
        self.conditions.retain(|c| keep(c.category));
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn composite(category: Category, status: ConditionStatus, reason: &str) -> CompositeCondition {
        CompositeCondition {
            category,
            status,
            reason: reason.to_string(),
            message: String::new(),
            last_transition_time: None,
        }
    }

    #[test]
    fn test_set_condition_inserts_in_category_order() {
        let now = Utc::now();
        let mut record = StatusRecord::new("operator");

        record.set_condition(&composite(Category::Available, ConditionStatus::True, "AsExpected"), now);
        record.set_condition(&composite(Category::Degraded, ConditionStatus::False, "AsExpected"), now);

        let order: Vec<_> = record.conditions.iter().map(|c| c.category).collect();
        assert_eq!(order, vec![Category::Degraded, Category::Available]);
    }

    #[test]
    fn test_set_condition_keeps_transition_time_when_status_unchanged() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let mut record = StatusRecord::new("operator");

        let first = record.set_condition(
            &composite(Category::Degraded, ConditionStatus::True, "TypeA"),
            earlier,
        );
        assert_eq!(first.unwrap().from, None);

        let second = record.set_condition(
            &composite(Category::Degraded, ConditionStatus::True, "TypeA::TypeB"),
            now,
        );
        assert!(second.is_none());

        let stored = record.find_condition(Category::Degraded).unwrap();
        assert_eq!(stored.last_transition_time, earlier);
        assert_eq!(stored.reason, "TypeA::TypeB");
    }

    #[test]
    fn test_set_condition_moves_transition_time_on_change() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let mut record = StatusRecord::new("operator");

        record.set_condition(&composite(Category::Degraded, ConditionStatus::False, "AsExpected"), earlier);
        let transition = record
            .set_condition(&composite(Category::Degraded, ConditionStatus::True, "TypeA"), now)
            .unwrap();

        assert_eq!(transition.from, Some(ConditionStatus::False));
        assert_eq!(transition.to, ConditionStatus::True);
        assert_eq!(
            record.find_condition(Category::Degraded).unwrap().last_transition_time,
            now
        );
    }

    #[test]
    fn test_new_condition_uses_composite_transition_time() {
        let source_time = Utc::now() - Duration::minutes(3);
        let mut record = StatusRecord::new("operator");
        let mut degraded = composite(Category::Degraded, ConditionStatus::True, "TypeA");
        degraded.last_transition_time = Some(source_time);

        record.set_condition(&degraded, Utc::now());
        assert_eq!(
            record.find_condition(Category::Degraded).unwrap().last_transition_time,
            source_time
        );
    }

    #[test]
    fn test_set_condition_on_unsorted_record_updates_in_place() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let stored = |category, status| RecordCondition {
            category,
            status,
            reason: "AsExpected".to_string(),
            message: String::new(),
            last_transition_time: earlier,
        };
        let mut record = StatusRecord::new("operator");
        record.conditions = vec![
            stored(Category::Available, ConditionStatus::True),
            stored(Category::Degraded, ConditionStatus::False),
        ];

        let transition = record.set_condition(
            &composite(Category::Available, ConditionStatus::True, "AsExpected"),
            now,
        );
        assert!(transition.is_none());
        record.set_condition(&composite(Category::Progressing, ConditionStatus::True, "TypeA"), now);

        let order: Vec<_> = record.conditions.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![Category::Progressing, Category::Available, Category::Degraded]
        );
        assert_eq!(
            record.find_condition(Category::Available).unwrap().last_transition_time,
            earlier
        );
    }

    #[test]
    fn test_retain_categories() {
        let now = Utc::now();
        let mut record = StatusRecord::new("operator");
        record.set_condition(&composite(Category::Degraded, ConditionStatus::False, "AsExpected"), now);
        record.set_condition(&composite(Category::Progressing, ConditionStatus::True, "TypeA"), now);

        let removed = record.retain_categories(|c| c == Category::Degraded);
        assert_eq!(removed, vec![Category::Progressing]);
        assert_eq!(record.conditions.len(), 1);
    }
}
