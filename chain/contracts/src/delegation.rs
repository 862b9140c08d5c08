//! Delegated admin registry
//!
//! Per-resource management rights granted to supervisors, tracked outside
//! the role hierarchy. Entries default to false. A stored entry never
//! authorizes anything on its own: the permission gate always combines it
//! with a live role check.

use dao_types::ids::AccountId;
use dao_types::resource::{ResourceKind, ResourceRef};
use std::collections::HashSet;

/// Set of `(resource, delegate)` pairs currently authorized.
#[derive(Debug, Clone, Default)]
pub struct DelegatedAdminRegistry {
    grants: HashSet<(ResourceRef, AccountId)>,
}

impl DelegatedAdminRegistry {
    pub fn new() -> Self {
        Self {
            grants: HashSet::new(),
        }
    }

    /// Set or clear an entry. Returns `true` if the stored value changed.
    ///
    /// Only reachable through gated organization entry points.
    pub(crate) fn set_auth(&mut self, resource: ResourceRef, delegate: AccountId, value: bool) -> bool {
        if value {
            self.grants.insert((resource, delegate))
        } else {
            self.grants.remove(&(resource, delegate))
        }
    }

    /// Raw stored entry; `false` when never set.
    pub fn get_auth(&self, resource: &ResourceRef, delegate: &AccountId) -> bool {
        // HashSet lookup needs an owned key
        self.grants.contains(&(resource.clone(), *delegate))
    }

    /// Resources `delegate` holds entries for, ordered.
    pub fn grants_for(&self, delegate: &AccountId) -> Vec<ResourceRef> {
        let mut resources: Vec<_> = self
            .grants
            .iter()
            .filter(|(_, account)| account == delegate)
            .map(|(resource, _)| resource.clone())
            .collect();
        resources.sort();
        resources
    }

    /// Number of entries of a given kind.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.grants.iter().filter(|(r, _)| r.kind() == kind).count()
    }

    /// All entries ordered by resource then delegate.
    pub fn entries(&self) -> Vec<(ResourceRef, AccountId)> {
        let mut entries: Vec<_> = self.grants.iter().cloned().collect();
        entries.sort();
        entries
    }
}
