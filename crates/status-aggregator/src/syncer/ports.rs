//! Collaborators a sync pass reads from and writes to.

use async_trait::async_trait;
use status_types::{SourceCondition, StatusEventEnvelope, StatusRecord};

use crate::error::StatusResult;

/// Current sub-conditions of the managed component.
#[async_trait]
pub trait ConditionSource: Send + Sync {
    async fn current_conditions(&self) -> StatusResult<Vec<SourceCondition>>;
}

/// Versioned store for status records.
///
/// Writes are compare-and-swap on `resource_version`: `update` must fail
/// with [`StatusError::Conflict`](crate::StatusError::Conflict) if the
/// stored version differs from the one on the record passed in. Successful
/// writes return the record with its new version.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Read the current record, if one exists.
    async fn get(&self, name: &str) -> StatusResult<Option<StatusRecord>>;

    /// Persist a record that does not exist yet.
    async fn create(&self, record: StatusRecord) -> StatusResult<StatusRecord>;

    /// Replace an existing record.
    async fn update(&self, record: StatusRecord) -> StatusResult<StatusRecord>;
}

/// Side channel for human-readable status events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: StatusEventEnvelope);
}
