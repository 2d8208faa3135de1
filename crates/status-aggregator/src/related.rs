//! Related-object reconciliation.
//!
//! Merges the statically configured references, an optional dynamically
//! computed list and the list already persisted on the record:
//!
//! | dynamic source        | result               |
//! |-----------------------|----------------------|
//! | not registered        | `static`             |
//! | registered, resolved  | `dynamic ++ static`  |
//! | registered, failed    | `static ++ existing` |
//!
//! Duplicates are kept as given.

use std::collections::HashSet;

use status_types::ObjectReference;

/// Supplies the dynamically computed related objects.
///
/// `None` means the list could not be computed this pass.
pub trait RelatedObjectsSource: Send + Sync {
    fn resolve(&self) -> Option<Vec<ObjectReference>>;
}

impl<F> RelatedObjectsSource for F
where
    F: Fn() -> Option<Vec<ObjectReference>> + Send + Sync,
{
    fn resolve(&self) -> Option<Vec<ObjectReference>> {
        self()
    }
}

/// Outcome of consulting the dynamic source for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicRelatedObjects {
    /// No dynamic source is configured.
    Unregistered,
    /// A source is configured but could not produce a list.
    Unavailable,
    /// A source produced this list.
    Resolved(Vec<ObjectReference>),
}

impl DynamicRelatedObjects {
    /// Consult an optional source.
    pub fn from_source(source: Option<&dyn RelatedObjectsSource>) -> Self {
        match source {
            None => DynamicRelatedObjects::Unregistered,
            Some(source) => match source.resolve() {
                Some(refs) => DynamicRelatedObjects::Resolved(refs),
                None => DynamicRelatedObjects::Unavailable,
            },
        }
    }
}

/// Merge related-object lists by precedence.
pub fn reconcile(
    has_dynamic: bool,
    dynamic_ok: bool,
    dynamic: &[ObjectReference],
    static_refs: &[ObjectReference],
    existing: &[ObjectReference],
) -> Vec<ObjectReference> {
    match (has_dynamic, dynamic_ok) {
        (false, _) => static_refs.to_vec(),
        (true, true) => dynamic.iter().chain(static_refs).cloned().collect(),
        (true, false) => static_refs.iter().chain(existing).cloned().collect(),
    }
}

/// Typed form of [`reconcile`].
pub fn reconcile_related_objects(
    dynamic: DynamicRelatedObjects,
    static_refs: &[ObjectReference],
    existing: &[ObjectReference],
) -> Vec<ObjectReference> {
    match dynamic {
        DynamicRelatedObjects::Unregistered => reconcile(false, false, &[], static_refs, existing),
        DynamicRelatedObjects::Unavailable => reconcile(true, false, &[], static_refs, existing),
        DynamicRelatedObjects::Resolved(refs) => reconcile(true, true, &refs, static_refs, existing),
    }
}

/// Compare two lists as sets, ignoring order and duplicates.
pub fn same_set(a: &[ObjectReference], b: &[ObjectReference]) -> bool {
    let a: HashSet<&ObjectReference> = a.iter().collect();
    let b: HashSet<&ObjectReference> = b.iter().collect();
    a == b
}
