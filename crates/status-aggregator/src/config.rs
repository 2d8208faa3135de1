//! Status publishing configuration.
//!
//! Defines inertia rules, static related objects and sync behavior. The
//! configuration is plain data; [`InertiaConfig::build_policy`] and
//! `SyncerSettings::from_config` turn it into the immutable values the
//! aggregator and syncer run on.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use status_types::ObjectReference;

use crate::error::StatusResult;
use crate::inertia::{InertiaPolicy, InertiaRule, MatcherKind};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "OPSTATUS";

/// Main status configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Name of the status record to publish into
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// Degraded inertia rules
    #[serde(default)]
    pub inertia: InertiaConfig,

    /// Related objects that are always reported
    #[serde(default)]
    pub related_objects: Vec<ObjectReference>,

    /// Sync behavior
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            record_name: default_record_name(),
            inertia: InertiaConfig::default(),
            related_objects: Vec::new(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Inertia configuration for the Degraded category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InertiaConfig {
    /// Hold applied to condition types no rule matches
    #[serde(default = "default_hold_secs")]
    pub default_hold_secs: u64,

    /// Per-type overrides, first match wins
    #[serde(default)]
    pub rules: Vec<InertiaRuleConfig>,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            default_hold_secs: default_hold_secs(),
            rules: Vec::new(),
        }
    }
}

impl InertiaConfig {
    /// Compile every rule into an immutable policy.
    pub fn build_policy(&self) -> StatusResult<InertiaPolicy> {
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                let matcher = rule.kind.compile(&rule.pattern)?;
                Ok(InertiaRule::with_matcher(
                    matcher,
                    Duration::from_secs(rule.hold_secs),
                ))
            })
            .collect::<StatusResult<Vec<_>>>()?;

        Ok(InertiaPolicy::new(
            Duration::from_secs(self.default_hold_secs),
            rules,
        ))
    }
}

/// One configured inertia override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InertiaRuleConfig {
    /// Condition-type pattern
    pub pattern: String,

    /// Hold for matching condition types, in seconds
    pub hold_secs: u64,

    /// How `pattern` is interpreted
    #[serde(default)]
    pub kind: MatcherKind,
}

/// Sync behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Conflict retries after the first write attempt
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Emit status events on transitions
    #[serde(default = "default_true")]
    pub emit_events: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            emit_events: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_record_name() -> String {
    "operator".to_string()
}

fn default_hold_secs() -> u64 {
    120
}

fn default_max_conflict_retries() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl StatusConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&str>) -> StatusResult<Self> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&StatusConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // OPSTATUS_RECORD_NAME, OPSTATUS_SYNC__MAX_CONFLICT_RETRIES, ...
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
