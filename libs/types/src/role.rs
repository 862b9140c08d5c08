//! Role hierarchy
//!
//! Four roles, totally ordered `OWNER > ADMIN > SUPERVISOR > USER`. Each
//! role is administered by the role immediately above it; `OWNER` is
//! administered by the `ROOT` sentinel, which no account can ever hold.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A member's rank in the organization.
///
/// Variant order defines the privilege order, so the derived `Ord` is the
/// hierarchy: `User < Supervisor < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Supervisor,
    Admin,
    Owner,
}

/// The authority that administers a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleAdmin {
    /// Administers `Owner`; unassignable.
    Root,
    Role(Role),
}

impl Role {
    /// All roles, lowest first.
    pub const ALL: [Role; 4] = [Role::User, Role::Supervisor, Role::Admin, Role::Owner];

    /// Role that administers `self`. Fixed for the lifetime of the system.
    pub const fn admin_role(self) -> RoleAdmin {
        match self {
            Role::Owner => RoleAdmin::Root,
            Role::Admin => RoleAdmin::Role(Role::Owner),
            Role::Supervisor => RoleAdmin::Role(Role::Admin),
            Role::User => RoleAdmin::Role(Role::Supervisor),
        }
    }

    /// Whether a holder of `self` has admin rights over `other`.
    ///
    /// True iff `self` is the admin role of `other` or outranks it. Nothing
    /// administers `Owner`, and no role administers its own peers.
    pub fn administers(self, other: Role) -> bool {
        match other.admin_role() {
            RoleAdmin::Root => false,
            RoleAdmin::Role(admin) => self >= admin,
        }
    }

    /// Canonical role name as exposed to external callers (e.g. "ADMIN_ROLE").
    pub const fn name(self) -> &'static str {
        match self {
            Role::Owner => "OWNER_ROLE",
            Role::Admin => "ADMIN_ROLE",
            Role::Supervisor => "SUPERVISOR_ROLE",
            Role::User => "USER_ROLE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for RoleAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleAdmin::Root => f.write_str("DEFAULT_ADMIN_ROLE"),
            RoleAdmin::Role(role) => role.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_total_order() {
        assert!(Role::Owner > Role::Admin);
        assert!(Role::Admin > Role::Supervisor);
        assert!(Role::Supervisor > Role::User);
    }

    #[test]
    fn test_admin_role_chain() {
        assert_eq!(Role::User.admin_role(), RoleAdmin::Role(Role::Supervisor));
        assert_eq!(Role::Supervisor.admin_role(), RoleAdmin::Role(Role::Admin));
        assert_eq!(Role::Admin.admin_role(), RoleAdmin::Role(Role::Owner));
        assert_eq!(Role::Owner.admin_role(), RoleAdmin::Root);
    }

    #[test]
    fn test_nothing_administers_owner() {
        for role in Role::ALL {
            assert!(!role.administers(Role::Owner));
        }
    }

    #[test]
    fn test_peers_never_administer_each_other() {
        for role in Role::ALL {
            assert!(!role.administers(role), "{role} must not administer itself");
        }
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Supervisor).unwrap();
        assert_eq!(json, "\"SUPERVISOR\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_role_admin_display() {
        assert_eq!(Role::Owner.admin_role().to_string(), "DEFAULT_ADMIN_ROLE");
        assert_eq!(Role::User.admin_role().to_string(), "SUPERVISOR_ROLE");
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        /// Admin rights coincide with strictly outranking the other role.
        #[test]
        fn fuzz_administers_matches_strict_order(a in any_role(), b in any_role()) {
            prop_assert_eq!(a.administers(b), a > b);
        }
    }
}
