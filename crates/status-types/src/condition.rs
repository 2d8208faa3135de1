//! Condition types
//!
//! Source conditions are reported by independent controllers; composite
//! conditions are what the aggregator derives from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    /// The opposite definite status. `Unknown` stays `Unknown`.
    pub fn flip(self) -> Self {
        match self {
            ConditionStatus::True => ConditionStatus::False,
            ConditionStatus::False => ConditionStatus::True,
            ConditionStatus::Unknown => ConditionStatus::Unknown,
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionStatus::True => write!(f, "True"),
            ConditionStatus::False => write!(f, "False"),
            ConditionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Aggregation axis a condition contributes to
///
/// Declaration order is the order composites are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Degraded,
    Progressing,
    Available,
}

impl Category {
    /// All categories, in emission order
    pub const ALL: [Category; 3] = [Category::Degraded, Category::Progressing, Category::Available];

    /// Type suffix identifying conditions of this category
    pub fn suffix(self) -> &'static str {
        match self {
            Category::Degraded => "Degraded",
            Category::Progressing => "Progressing",
            Category::Available => "Available",
        }
    }

    /// Status a condition of this category reports when all is well
    pub fn healthy_status(self) -> ConditionStatus {
        match self {
            Category::Degraded | Category::Progressing => ConditionStatus::False,
            Category::Available => ConditionStatus::True,
        }
    }

    /// Status a condition of this category reports when something is wrong
    pub fn failing_status(self) -> ConditionStatus {
        self.healthy_status().flip()
    }

    /// Whether failures in this category are debounced by an inertia policy
    pub fn uses_inertia(self) -> bool {
        matches!(self, Category::Degraded)
    }

    /// Condition type with this category's suffix removed.
    ///
    /// Returns `None` when the type does not carry the suffix.
    pub fn stem(self, condition_type: &str) -> Option<&str> {
        condition_type.strip_suffix(self.suffix())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A single condition reported by a sub-controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCondition {
    /// Condition type, conventionally ending in a category suffix
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Reported status
    pub status: ConditionStatus,

    /// When the status last changed
    pub last_transition_time: DateTime<Utc>,

    /// Machine-readable reason, may be empty
    #[serde(default)]
    pub reason: String,

    /// Human-readable message, may span several lines
    #[serde(default)]
    pub message: String,
}

impl SourceCondition {
    pub fn new(
        condition_type: impl Into<String>,
        status: ConditionStatus,
        last_transition_time: DateTime<Utc>,
    ) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
            last_transition_time,
            reason: String::new(),
            message: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Aggregated condition for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeCondition {
    pub category: Category,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,

    /// Latest transition among the sources that decided the status.
    /// `None` when there was no data.
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl CompositeCondition {
    /// Whether the composite reports its category's healthy status
    pub fn is_healthy(&self) -> bool {
        self.status == self.category.healthy_status()
    }
}
