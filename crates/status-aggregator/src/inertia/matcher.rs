//! Condition-type matchers used by inertia rules.

use std::fmt;
use std::sync::Arc;

use globset::Glob;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{StatusError, StatusResult};

/// Decides whether an inertia rule applies to a condition type.
pub trait ConditionTypeMatcher: Send + Sync + fmt::Debug {
    /// Whether the condition type is covered by this matcher.
    fn matches(&self, condition_type: &str) -> bool;

    /// Source pattern, for logs and diagnostics.
    fn pattern(&self) -> &str;
}

/// Which matcher implementation a configured pattern compiles to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Whole-string equality.
    Exact,
    /// Shell-style wildcards (`*`, `?`, `[..]`).
    Glob,
    /// Regular expression, unanchored unless the pattern anchors itself.
    #[default]
    Regex,
}

impl MatcherKind {
    /// Compile a pattern into a shareable matcher.
    pub fn compile(self, pattern: &str) -> StatusResult<Arc<dyn ConditionTypeMatcher>> {
        Ok(match self {
            MatcherKind::Exact => Arc::new(ExactMatcher::new(pattern)),
            MatcherKind::Glob => Arc::new(GlobMatcher::new(pattern)?),
            MatcherKind::Regex => Arc::new(RegexMatcher::new(pattern)?),
        })
    }
}

/// Matches one condition type exactly.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    condition_type: String,
}

impl ExactMatcher {
    pub fn new(condition_type: impl Into<String>) -> Self {
        Self {
            condition_type: condition_type.into(),
        }
    }
}

impl ConditionTypeMatcher for ExactMatcher {
    fn matches(&self, condition_type: &str) -> bool {
        self.condition_type == condition_type
    }

    fn pattern(&self) -> &str {
        &self.condition_type
    }
}

/// Matches condition types against a glob.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    matcher: globset::GlobMatcher,
}

impl GlobMatcher {
    pub fn new(pattern: &str) -> StatusResult<Self> {
        let glob = Glob::new(pattern).map_err(|e| StatusError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }
}

impl ConditionTypeMatcher for GlobMatcher {
    fn matches(&self, condition_type: &str) -> bool {
        self.matcher.is_match(condition_type)
    }

    fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Matches condition types against a regular expression.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> StatusResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| StatusError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl ConditionTypeMatcher for RegexMatcher {
    fn matches(&self, condition_type: &str) -> bool {
        self.regex.is_match(condition_type)
    }

    fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}
