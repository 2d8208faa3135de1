//! Property tests for condition aggregation.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use proptest::prelude::*;
use status_aggregator::{aggregate, InertiaPolicy, InertiaRule};
use status_types::{Category, ConditionStatus, SourceCondition};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn policy() -> InertiaPolicy {
    InertiaPolicy::new(
        Duration::from_secs(120),
        vec![InertiaRule::regex("^TypeC", Duration::from_secs(300)).unwrap()],
    )
}

fn arb_status() -> impl Strategy<Value = ConditionStatus> {
    prop_oneof![
        Just(ConditionStatus::True),
        Just(ConditionStatus::False),
        Just(ConditionStatus::Unknown),
    ]
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Degraded),
        Just(Category::Progressing),
        Just(Category::Available),
    ]
}

/// A condition whose last transition lies up to ten minutes before `now()`.
fn arb_condition() -> impl Strategy<Value = SourceCondition> {
    (
        "Type[A-F]",
        arb_category(),
        arb_status(),
        0i64..600,
        prop::option::of("[A-Z][a-z]{1,8}"),
        "[a-z ]{0,12}",
    )
        .prop_map(|(stem, category, status, age_secs, reason, message)| {
            let condition = SourceCondition::new(
                format!("{}{}", stem, category.suffix()),
                status,
                now() - ChronoDuration::seconds(age_secs),
            )
            .with_message(message);
            match reason {
                Some(reason) => condition.with_reason(reason),
                None => condition,
            }
        })
}

fn arb_conditions() -> impl Strategy<Value = Vec<SourceCondition>> {
    prop::collection::vec(arb_condition(), 0..8)
}

fn non_healthy_count(conditions: &[SourceCondition], category: Category) -> usize {
    conditions
        .iter()
        .filter(|c| c.condition_type.ends_with(category.suffix()))
        .filter(|c| c.status != category.healthy_status())
        .count()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Same inputs, same composites.
    #[test]
    fn aggregation_is_deterministic(conditions in arb_conditions()) {
        let policy = policy();
        prop_assert_eq!(
            aggregate(&conditions, &policy, now()),
            aggregate(&conditions, &policy, now())
        );
    }

    /// Degraded is always reported; NoData exactly when it has no sources.
    #[test]
    fn degraded_always_present(conditions in arb_conditions()) {
        let result = aggregate(&conditions, &policy(), now());
        let degraded = &result[&Category::Degraded];
        let has_sources = conditions
            .iter()
            .any(|c| c.condition_type.ends_with("Degraded"));

        prop_assert_eq!(degraded.reason == "NoData", !has_sources);
        if !has_sources {
            prop_assert_eq!(degraded.status, ConditionStatus::Unknown);
        }
    }

    /// An escalated composite names every non-healthy source once.
    #[test]
    fn reason_lists_every_non_healthy_source(conditions in arb_conditions()) {
        let result = aggregate(&conditions, &policy(), now());
        for (category, composite) in &result {
            if composite.is_healthy() {
                prop_assert_eq!(composite.reason.as_str(), "AsExpected");
            } else if composite.reason != "NoData" {
                prop_assert_eq!(
                    composite.reason.split("::").count(),
                    non_healthy_count(&conditions, *category)
                );
            }
        }
    }

    /// Once Degraded escalates it stays escalated as time passes.
    #[test]
    fn degraded_escalation_is_monotonic_in_time(
        conditions in arb_conditions(),
        later_secs in 0i64..3600,
    ) {
        let policy = policy();
        let before = aggregate(&conditions, &policy, now());
        let after = aggregate(&conditions, &policy, now() + ChronoDuration::seconds(later_secs));

        if before[&Category::Degraded].status == ConditionStatus::True {
            prop_assert_eq!(after[&Category::Degraded].status, ConditionStatus::True);
        }
    }

    /// Without holds Degraded reports True exactly when some source does.
    #[test]
    fn zero_hold_reports_raw_degraded(conditions in arb_conditions()) {
        let result = aggregate(&conditions, &InertiaPolicy::none(), now());
        let any_true = conditions
            .iter()
            .any(|c| c.condition_type.ends_with("Degraded") && c.status == ConditionStatus::True);

        prop_assert_eq!(
            result[&Category::Degraded].status == ConditionStatus::True,
            any_true
        );
    }

    /// Reason tokens follow source order rather than being sorted.
    #[test]
    fn reason_follows_source_order(conditions in arb_conditions()) {
        let policy = InertiaPolicy::none();
        let forward = aggregate(&conditions, &policy, now());

        let mut reversed_input = conditions.clone();
        reversed_input.reverse();
        let backward = aggregate(&reversed_input, &policy, now());

        for (category, composite) in &forward {
            if composite.is_healthy() || composite.reason == "NoData" {
                continue;
            }
            let mut tokens: Vec<&str> = composite.reason.split("::").collect();
            tokens.reverse();
            prop_assert_eq!(tokens.join("::"), backward[category].reason.clone());
        }
    }
}
