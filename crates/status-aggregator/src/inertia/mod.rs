//! Inertia policy: how long a failing condition is held back before it may
//! flip an aggregate.
//!
//! A policy is a default hold plus an ordered list of rules. The first rule
//! whose matcher accepts a condition type decides that type's hold. Patterns
//! are compiled when the policy is built, so a bad pattern is reported before
//! anything is evaluated.

mod matcher;

pub use matcher::{ConditionTypeMatcher, ExactMatcher, GlobMatcher, MatcherKind, RegexMatcher};

use std::sync::Arc;
use std::time::Duration;

use crate::error::StatusResult;

/// Hold duration for the condition types a matcher accepts.
#[derive(Debug, Clone)]
pub struct InertiaRule {
    matcher: Arc<dyn ConditionTypeMatcher>,
    hold: Duration,
}

impl InertiaRule {
    /// Rule backed by any matcher implementation.
    pub fn with_matcher(matcher: Arc<dyn ConditionTypeMatcher>, hold: Duration) -> Self {
        Self { matcher, hold }
    }

    /// Rule matching a regular expression.
    pub fn regex(pattern: &str, hold: Duration) -> StatusResult<Self> {
        Ok(Self::with_matcher(MatcherKind::Regex.compile(pattern)?, hold))
    }

    /// Rule matching a glob.
    pub fn glob(pattern: &str, hold: Duration) -> StatusResult<Self> {
        Ok(Self::with_matcher(MatcherKind::Glob.compile(pattern)?, hold))
    }

    /// Rule matching one condition type exactly.
    pub fn exact(condition_type: &str, hold: Duration) -> Self {
        Self::with_matcher(Arc::new(ExactMatcher::new(condition_type)), hold)
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn matches(&self, condition_type: &str) -> bool {
        self.matcher.matches(condition_type)
    }
}

/// Immutable per-condition-type debounce rules.
#[derive(Debug, Clone)]
pub struct InertiaPolicy {
    default_hold: Duration,
    rules: Vec<InertiaRule>,
}

impl Default for InertiaPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl InertiaPolicy {
    /// Build a policy from already-compiled rules.
    pub fn new(default_hold: Duration, rules: impl IntoIterator<Item = InertiaRule>) -> Self {
        Self {
            default_hold,
            rules: rules.into_iter().collect(),
        }
    }

    /// Policy that holds nothing back.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Vec::new())
    }

    /// Build a policy from `(regex, hold)` pairs, compiling every pattern
    /// before the policy exists.
    pub fn from_patterns<'a>(
        default_hold: Duration,
        patterns: impl IntoIterator<Item = (&'a str, Duration)>,
    ) -> StatusResult<Self> {
        let rules = patterns
            .into_iter()
            .map(|(pattern, hold)| InertiaRule::regex(pattern, hold))
            .collect::<StatusResult<Vec<_>>>()?;
        Ok(Self::new(default_hold, rules))
    }

    /// Hold duration for a condition type.
    pub fn hold_for(&self, condition_type: &str) -> Duration {
        self.rules
            .iter()
            .find(|rule| rule.matches(condition_type))
            .map(|rule| rule.hold)
            .unwrap_or(self.default_hold)
    }

    pub fn default_hold(&self) -> Duration {
        self.default_hold
    }

    pub fn rules(&self) -> &[InertiaRule] {
        &self.rules
    }
}
