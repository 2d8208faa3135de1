//! Condition aggregation.
//!
//! Reduces a set of source conditions to one composite condition per
//! category. The result is a pure function of the conditions, the inertia
//! policy and the supplied `now`; source order is preserved throughout, so
//! identical inputs always produce identical reasons and messages.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use status_types::{Category, CompositeCondition, ConditionStatus, SourceCondition};
use tracing::debug;

use crate::classifier::{self, ClassifiedConditions};
use crate::inertia::InertiaPolicy;

/// Reason reported when a category is in its healthy state.
pub const REASON_AS_EXPECTED: &str = "AsExpected";

/// Reason reported when no condition of a category exists.
pub const REASON_NO_DATA: &str = "NoData";

const REASON_SEPARATOR: &str = "::";

/// Aggregate all categories.
///
/// Degraded is always present (`Unknown`/`NoData` without sources);
/// Progressing and Available only when at least one source reports them.
/// The inertia policy governs the Degraded category only.
pub fn aggregate(
    conditions: &[SourceCondition],
    policy: &InertiaPolicy,
    now: DateTime<Utc>,
) -> BTreeMap<Category, CompositeCondition> {
    let classified = ClassifiedConditions::from_conditions(conditions);
    if classified.unrecognized() > 0 {
        debug!(
            ignored = classified.unrecognized(),
            "Conditions without a category suffix ignored"
        );
    }

    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let inertia = category.uses_inertia().then_some(policy);
            union_category(category, classified.get(category), inertia, now)
                .map(|composite| (category, composite))
        })
        .collect()
}

/// Reduce the sources of one category to its composite.
///
/// With an inertia policy, only sources that report the failing status for
/// at least their hold duration can escalate the composite. Without one,
/// every non-healthy source escalates. Reason and message list every
/// non-healthy source once the composite has escalated, so conditions still
/// inside their hold window stay visible.
pub fn union_category(
    category: Category,
    sources: &[&SourceCondition],
    inertia: Option<&InertiaPolicy>,
    now: DateTime<Utc>,
) -> Option<CompositeCondition> {
    if sources.is_empty() {
        return (category == Category::Degraded).then(|| CompositeCondition {
            category,
            status: ConditionStatus::Unknown,
            reason: REASON_NO_DATA.to_string(),
            message: String::new(),
            last_transition_time: None,
        });
    }

    let healthy = category.healthy_status();
    let non_healthy = classifier::non_healthy(category, sources);

    let escalating: Vec<&SourceCondition> = match inertia {
        Some(policy) => non_healthy
            .iter()
            .copied()
            .filter(|c| c.status == category.failing_status() && outlasted_hold(c, policy, now))
            .collect(),
        None => non_healthy.clone(),
    };

    if escalating.is_empty() {
        return Some(CompositeCondition {
            category,
            status: healthy,
            reason: REASON_AS_EXPECTED.to_string(),
            message: union_message(sources),
            last_transition_time: latest_transition(sources),
        });
    }

    let status = if escalating
        .iter()
        .any(|c| c.status == ConditionStatus::Unknown)
    {
        ConditionStatus::Unknown
    } else {
        category.failing_status()
    };

    Some(CompositeCondition {
        category,
        status,
        reason: union_reason(category, &non_healthy),
        message: union_message(&non_healthy),
        last_transition_time: latest_transition(&escalating),
    })
}

/// Whether a condition has stayed in its current state for its hold duration.
fn outlasted_hold(condition: &SourceCondition, policy: &InertiaPolicy, now: DateTime<Utc>) -> bool {
    let hold = policy.hold_for(&condition.condition_type);
    // Transitions stamped in the future count as brand new
    let age = (now - condition.last_transition_time)
        .to_std()
        .unwrap_or(Duration::ZERO);

    if age >= hold {
        return true;
    }

    debug!(
        condition_type = %condition.condition_type,
        age_secs = age.as_secs(),
        hold_secs = hold.as_secs(),
        "Failing condition absorbed by inertia"
    );
    false
}

/// `Stem[_Reason]` tokens joined with `::`, in source order.
fn union_reason(category: Category, conditions: &[&SourceCondition]) -> String {
    conditions
        .iter()
        .map(|c| {
            let stem = category
                .stem(&c.condition_type)
                .unwrap_or(&c.condition_type);
            if c.reason.is_empty() {
                stem.to_string()
            } else {
                format!("{}_{}", stem, c.reason)
            }
        })
        .collect::<Vec<_>>()
        .join(REASON_SEPARATOR)
}

/// One `Type: line` entry per message line, in source order.
fn union_message(conditions: &[&SourceCondition]) -> String {
    conditions
        .iter()
        .filter(|c| !c.message.is_empty())
        .flat_map(|c| {
            c.message
                .split('\n')
                .map(move |line| format!("{}: {}", c.condition_type, line))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn latest_transition(conditions: &[&SourceCondition]) -> Option<DateTime<Utc>> {
    conditions.iter().map(|c| c.last_transition_time).max()
}

/// Aggregator bound to a shared inertia policy.
#[derive(Debug, Clone)]
pub struct Aggregator {
    policy: Arc<InertiaPolicy>,
}

impl Aggregator {
    pub fn new(policy: Arc<InertiaPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &InertiaPolicy {
        &self.policy
    }

    pub fn aggregate(
        &self,
        conditions: &[SourceCondition],
        now: DateTime<Utc>,
    ) -> BTreeMap<Category, CompositeCondition> {
        aggregate(conditions, &self.policy, now)
    }
}
