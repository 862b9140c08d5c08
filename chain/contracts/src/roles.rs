//! Role registry
//!
//! Stores the role of every member and answers hierarchy queries. An
//! account is a member iff it holds a role here. Exactly one account holds
//! `Owner`, fixed at creation: the registry refuses to assign `Owner` or to
//! change or remove the owner's entry.

use dao_types::ids::AccountId;
use dao_types::role::{Role, RoleAdmin};
use std::collections::HashMap;

/// Role-based access control over the four-level hierarchy.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<AccountId, Role>,
    owner: AccountId,
}

impl RoleRegistry {
    /// Create a registry whose only member is `owner`.
    pub fn new(owner: AccountId) -> Self {
        let mut roles = HashMap::new();
        roles.insert(owner, Role::Owner);
        Self { roles, owner }
    }

    /// The organization owner.
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// Current role of an account; `None` for non-members.
    pub fn role_of(&self, account: &AccountId) -> Option<Role> {
        self.roles.get(account).copied()
    }

    pub fn is_member(&self, account: &AccountId) -> bool {
        self.roles.contains_key(account)
    }

    /// Exact role match: a promoted USER no longer has `Role::User`.
    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.role_of(account) == Some(role)
    }

    /// Whether the account holds `role` or anything above it.
    pub fn has_role_at_least(&self, account: &AccountId, role: Role) -> bool {
        self.role_of(account).map_or(false, |r| r >= role)
    }

    /// Administrator of a role in the fixed chain.
    pub fn admin_role_of(role: Role) -> RoleAdmin {
        role.admin_role()
    }

    /// Whether `caller` holds admin rights over `role` (admin-or-above).
    pub fn has_admin_rights(&self, caller: &AccountId, role: Role) -> bool {
        self.role_of(caller).map_or(false, |r| r.administers(role))
    }

    /// Set the role of an account. Refuses anything touching `Owner`.
    pub(crate) fn assign(&mut self, account: AccountId, role: Role) -> bool {
        if role == Role::Owner || account == self.owner {
            return false;
        }
        self.roles.insert(account, role);
        true
    }

    /// Remove an account. The owner cannot be removed.
    pub(crate) fn remove(&mut self, account: &AccountId) -> Option<Role> {
        if *account == self.owner {
            return None;
        }
        self.roles.remove(account)
    }

    /// All members with their roles, ordered by account.
    pub fn members(&self) -> Vec<(AccountId, Role)> {
        let mut members: Vec<_> = self.roles.iter().map(|(a, r)| (*a, *r)).collect();
        members.sort();
        members
    }

    pub fn member_count(&self) -> usize {
        self.roles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (RoleRegistry, AccountId) {
        let owner = AccountId::new();
        (RoleRegistry::new(owner), owner)
    }

    #[test]
    fn test_owner_is_member() {
        let (reg, owner) = registry();
        assert_eq!(reg.owner(), owner);
        assert!(reg.is_member(&owner));
        assert!(reg.has_role(Role::Owner, &owner));
        assert_eq!(reg.member_count(), 1);
    }

    #[test]
    fn test_unknown_account_has_no_role() {
        let (reg, _) = registry();
        let stranger = AccountId::new();
        assert_eq!(reg.role_of(&stranger), None);
        assert!(!reg.has_role_at_least(&stranger, Role::User));
        assert!(!reg.has_admin_rights(&stranger, Role::User));
    }

    #[test]
    fn test_has_role_is_exact() {
        let (mut reg, _) = registry();
        let acc = AccountId::new();
        assert!(reg.assign(acc, Role::Supervisor));
        assert!(reg.has_role(Role::Supervisor, &acc));
        assert!(!reg.has_role(Role::User, &acc));
        assert!(reg.has_role_at_least(&acc, Role::User));
        assert!(!reg.has_role_at_least(&acc, Role::Admin));
    }

    #[test]
    fn test_admin_rights_follow_hierarchy() {
        let (mut reg, owner) = registry();
        let admin = AccountId::new();
        reg.assign(admin, Role::Admin);

        assert!(reg.has_admin_rights(&owner, Role::Admin));
        assert!(reg.has_admin_rights(&admin, Role::Supervisor));
        assert!(reg.has_admin_rights(&admin, Role::User));
        assert!(!reg.has_admin_rights(&admin, Role::Admin));
        assert!(!reg.has_admin_rights(&owner, Role::Owner));
    }

    #[test]
    fn test_admin_role_of_chain() {
        assert_eq!(RoleRegistry::admin_role_of(Role::Owner), RoleAdmin::Root);
        assert_eq!(
            RoleRegistry::admin_role_of(Role::Admin),
            RoleAdmin::Role(Role::Owner)
        );
    }

    #[test]
    fn test_cannot_assign_owner_role() {
        let (mut reg, _) = registry();
        let acc = AccountId::new();
        assert!(!reg.assign(acc, Role::Owner));
        assert!(!reg.is_member(&acc));
    }

    #[test]
    fn test_cannot_change_or_remove_owner() {
        let (mut reg, owner) = registry();
        assert!(!reg.assign(owner, Role::User));
        assert_eq!(reg.remove(&owner), None);
        assert!(reg.has_role(Role::Owner, &owner));
    }

    #[test]
    fn test_remove_member() {
        let (mut reg, _) = registry();
        let acc = AccountId::new();
        reg.assign(acc, Role::User);
        assert_eq!(reg.remove(&acc), Some(Role::User));
        assert!(!reg.is_member(&acc));
        assert_eq!(reg.remove(&acc), None);
    }

    #[test]
    fn test_members_sorted() {
        let (mut reg, owner) = registry();
        let a = AccountId::new();
        let b = AccountId::new();
        reg.assign(b, Role::User);
        reg.assign(a, Role::Admin);
        let members = reg.members();
        assert_eq!(members.len(), 3);
        assert!(members.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(members.contains(&(owner, Role::Owner)));
    }
}
