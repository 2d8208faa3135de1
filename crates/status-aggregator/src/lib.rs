//! # Status Aggregator - Condition Aggregation with Inertia
//!
//! This crate turns the many independent conditions a managed component
//! reports into one composite condition per category, and publishes the
//! result into a versioned status record.
//!
//! ## Overview
//!
//! Source conditions are classified by the suffix of their type:
//!
//! - **Degraded**: `"...Degraded"`, healthy when `False`
//! - **Progressing**: `"...Progressing"`, healthy when `False`
//! - **Available**: `"...Available"`, healthy when `True`
//!
//! Degraded is debounced: a source only escalates the composite once it has
//! reported `True` for at least its hold duration. Hold durations come from
//! an [`InertiaPolicy`], matched against the condition type.
//!
//! ## Key Components
//!
//! - [`aggregate()`]: Pure reduction from sources to composites
//! - [`InertiaPolicy`]: Per-condition-type hold durations
//! - [`related`]: Related-object reconciliation
//! - [`StatusSyncer`]: One publish pass with conflict retries
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use status_aggregator::{
//!     InMemoryConditionSource, InMemoryStatusSink, NoOpEventSink, StatusConfig, StatusSyncer,
//!     SyncerSettings,
//! };
//!
//! # async fn example() -> status_aggregator::StatusResult<()> {
//! let config = StatusConfig::load(Some("config/status"))?;
//! let settings = SyncerSettings::from_config(&config, None)?;
//!
//! let syncer = StatusSyncer::new(
//!     settings,
//!     Arc::new(InMemoryConditionSource::default()),
//!     Arc::new(InMemoryStatusSink::new()),
//!     Arc::new(NoOpEventSink),
//! );
//!
//! let outcome = syncer.sync().await?;
//! for condition in &outcome.record().conditions {
//!     println!("{}: {} ({})", condition.category, condition.status, condition.reason);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod inertia;
pub mod related;
pub mod syncer;
pub mod telemetry;

// Re-export main types
pub use aggregate::{aggregate, union_category, Aggregator, REASON_AS_EXPECTED, REASON_NO_DATA};
pub use classifier::{classify, ClassifiedConditions};
pub use config::{
    InertiaConfig, InertiaRuleConfig, LoggingConfig, StatusConfig, SyncConfig, ENV_PREFIX,
};
pub use error::{StatusError, StatusResult};
pub use inertia::{ConditionTypeMatcher, InertiaPolicy, InertiaRule, MatcherKind};
pub use related::{
    reconcile, reconcile_related_objects, same_set, DynamicRelatedObjects, RelatedObjectsSource,
};
pub use syncer::{
    BroadcastEventSink, ConditionSource, EventSink, InMemoryConditionSource, InMemoryStatusSink,
    NoOpEventSink, StatusSink, StatusSyncer, SyncOutcome, SyncPlan, SyncerSettings,
    UnavailableConditionSource,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use status_types::{Category, ConditionStatus, SourceCondition};
    use std::time::Duration;

    #[test]
    fn test_default_config_builds_policy() {
        let config = StatusConfig::default();
        let policy = config.inertia.build_policy().unwrap();

        assert_eq!(policy.default_hold(), Duration::from_secs(120));
        assert!(policy.rules().is_empty());
    }

    #[test]
    fn test_degraded_escalates_only_after_hold() {
        let now = Utc::now();
        let policy = InertiaPolicy::new(Duration::from_secs(120), Vec::new());
        let fresh = SourceCondition::new(
            "WebhookDegraded",
            ConditionStatus::True,
            now - ChronoDuration::seconds(30),
        );

        let result = aggregate(std::slice::from_ref(&fresh), &policy, now);
        assert_eq!(result[&Category::Degraded].status, ConditionStatus::False);

        let later = now + ChronoDuration::seconds(90);
        let result = aggregate(std::slice::from_ref(&fresh), &policy, later);
        assert_eq!(result[&Category::Degraded].status, ConditionStatus::True);
        assert_eq!(result[&Category::Degraded].reason, "Webhook");
    }
}
