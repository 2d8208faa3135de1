//! Status Types - Core types for operator condition aggregation
//!
//! A managed component reports many independent conditions
//! (`"WebhookDegraded"`, `"RolloutProgressing"`, ...). The aggregator
//! reduces them to one composite condition per [`Category`] and publishes the
//! result into a [`StatusRecord`] that higher-level orchestration consumes.
//!
//! ## Key Concepts
//!
//! - **SourceCondition**: One timestamped tri-state sub-condition
//! - **Category**: Degraded, Progressing or Available aggregation axis
//! - **CompositeCondition**: The aggregated signal for one category
//! - **ObjectReference**: A pointer to an object related to the component
//! - **StatusRecord**: The persisted, versioned status document
//! - **Events**: Transitions observed while publishing a record

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod condition;
pub mod events;
pub mod object_ref;
pub mod record;

// Re-export main types
pub use condition::{Category, CompositeCondition, ConditionStatus, SourceCondition};
pub use events::{EventSeverity, StatusEvent, StatusEventEnvelope};
pub use object_ref::ObjectReference;
pub use record::{ConditionTransition, RecordCondition, StatusRecord};
