//! Permission gate
//!
//! Single authorization decision consulted before every gated organization
//! operation. Combines the live role of the caller with per-resource
//! delegations.
//!
//! | Operation family                                   | Minimum credential                       |
//! |----------------------------------------------------|------------------------------------------|
//! | token create / mint, delegation grant / revoke     | ADMIN                                    |
//! | token transfer                                     | ADMIN, or SUPERVISOR delegated on symbol |
//! | crowdsale / exchange create, stop, unlock, cancel, renew | ADMIN                              |
//! | crowdsale join / refund, exchange accept / refill  | SUPERVISOR (no delegation needed)        |

use dao_types::ids::AccountId;
use dao_types::resource::{ResourceKind, ResourceRef};
use dao_types::role::Role;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::delegation::DelegatedAdminRegistry;
use crate::errors::DaoError;
use crate::roles::RoleRegistry;

/// Gated organization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    CreateToken,
    MintToken,
    TransferToken,
    ManageTokenAuth,
    CreateCrowdsale,
    UnlockCrowdsale,
    StopCrowdsale,
    JoinCrowdsale,
    RefundCrowdsale,
    ManageCrowdsaleAdmin,
    CreateExchange,
    CancelExchange,
    RenewExchange,
    AcceptExchange,
    RefillExchange,
    ManageExchangeAdmin,
}

impl Operation {
    /// Role that is always sufficient for this operation.
    pub const fn minimum_role(self) -> Role {
        match self {
            // Participation is open to supervisors on every crowdsale and
            // exchange, unlike token transfers which need a delegation.
            Operation::JoinCrowdsale
            | Operation::RefundCrowdsale
            | Operation::AcceptExchange
            | Operation::RefillExchange => Role::Supervisor,
            _ => Role::Admin,
        }
    }

    /// Resource kind whose delegation lets a SUPERVISOR perform this operation.
    pub const fn delegable(self) -> Option<ResourceKind> {
        match self {
            Operation::TransferToken => Some(ResourceKind::Token),
            _ => None,
        }
    }
}

/// Read-only view over the registries that decides authorization.
#[derive(Debug, Clone, Copy)]
pub struct PermissionGate<'a> {
    roles: &'a RoleRegistry,
    delegations: &'a DelegatedAdminRegistry,
}

impl<'a> PermissionGate<'a> {
    pub fn new(roles: &'a RoleRegistry, delegations: &'a DelegatedAdminRegistry) -> Self {
        Self { roles, delegations }
    }

    /// Whether `caller` may perform `operation` on `resource`.
    pub fn authorize(
        &self,
        caller: &AccountId,
        operation: Operation,
        resource: Option<&ResourceRef>,
    ) -> bool {
        let Some(role) = self.roles.role_of(caller) else {
            return false;
        };
        if role >= operation.minimum_role() {
            return true;
        }
        match (operation.delegable(), resource) {
            (Some(kind), Some(resource)) => {
                role == Role::Supervisor
                    && resource.kind() == kind
                    && self.delegations.get_auth(resource, caller)
            }
            _ => false,
        }
    }

    /// [`authorize`](Self::authorize) as a `Result`.
    pub fn require(
        &self,
        caller: &AccountId,
        operation: Operation,
        resource: Option<&ResourceRef>,
    ) -> Result<(), DaoError> {
        if self.authorize(caller, operation, resource) {
            return Ok(());
        }
        debug!(
            caller = %caller,
            role = ?self.roles.role_of(caller),
            ?operation,
            resource = ?resource,
            "Operation rejected"
        );
        Err(DaoError::NotAuthorized)
    }

    /// Validate the recipient of a delegated management right.
    ///
    /// Only a SUPERVISOR other than the caller can receive one: ADMIN and
    /// above already hold every right, USER and non-members never may.
    pub fn check_grantee(&self, caller: &AccountId, grantee: &AccountId) -> Result<(), DaoError> {
        if caller == grantee {
            return Err(DaoError::invalid("cannot delegate to self"));
        }
        match self.roles.role_of(grantee) {
            Some(Role::Supervisor) => Ok(()),
            Some(Role::Admin) | Some(Role::Owner) => Err(DaoError::invalid(format!(
                "{grantee} already holds ADMIN or above"
            ))),
            Some(Role::User) | None => {
                debug!(caller = %caller, grantee = %grantee, "Delegation grantee rejected");
                Err(DaoError::NotAuthorized)
            }
        }
    }

    /// Delegation entry combined with the live role check.
    pub fn is_delegated(&self, resource: &ResourceRef, delegate: &AccountId) -> bool {
        self.roles.has_role(Role::Supervisor, delegate)
            && self.delegations.get_auth(resource, delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_types::ids::{CrowdsaleId, ExchangeId, TokenSymbol};

    struct Fixture {
        roles: RoleRegistry,
        delegations: DelegatedAdminRegistry,
        owner: AccountId,
        admin: AccountId,
        supervisor: AccountId,
        user: AccountId,
    }

    fn setup() -> Fixture {
        let owner = AccountId::new();
        let mut roles = RoleRegistry::new(owner);
        let admin = AccountId::new();
        let supervisor = AccountId::new();
        let user = AccountId::new();
        roles.assign(admin, Role::Admin);
        roles.assign(supervisor, Role::Supervisor);
        roles.assign(user, Role::User);
        Fixture {
            roles,
            delegations: DelegatedAdminRegistry::new(),
            owner,
            admin,
            supervisor,
            user,
        }
    }

    fn eur() -> ResourceRef {
        ResourceRef::Token(TokenSymbol::new("EUR"))
    }

    const MANAGER_OPS: [Operation; 12] = [
        Operation::CreateToken,
        Operation::MintToken,
        Operation::TransferToken,
        Operation::ManageTokenAuth,
        Operation::CreateCrowdsale,
        Operation::UnlockCrowdsale,
        Operation::StopCrowdsale,
        Operation::ManageCrowdsaleAdmin,
        Operation::CreateExchange,
        Operation::CancelExchange,
        Operation::RenewExchange,
        Operation::ManageExchangeAdmin,
    ];

    const PARTICIPANT_OPS: [Operation; 4] = [
        Operation::JoinCrowdsale,
        Operation::RefundCrowdsale,
        Operation::AcceptExchange,
        Operation::RefillExchange,
    ];

    #[test]
    fn test_manager_ops_require_admin() {
        let f = setup();
        let gate = PermissionGate::new(&f.roles, &f.delegations);
        for op in MANAGER_OPS {
            assert!(gate.authorize(&f.owner, op, None), "{op:?} owner");
            assert!(gate.authorize(&f.admin, op, None), "{op:?} admin");
            assert!(!gate.authorize(&f.supervisor, op, None), "{op:?} supervisor");
            assert!(!gate.authorize(&f.user, op, None), "{op:?} user");
        }
    }

    #[test]
    fn test_participant_ops_allow_supervisor() {
        let f = setup();
        let gate = PermissionGate::new(&f.roles, &f.delegations);
        let crowdsale = ResourceRef::Crowdsale(CrowdsaleId::new());
        let exchange = ResourceRef::Exchange(ExchangeId::new());
        for op in PARTICIPANT_OPS {
            let resource = if matches!(op, Operation::JoinCrowdsale | Operation::RefundCrowdsale) {
                &crowdsale
            } else {
                &exchange
            };
            assert!(gate.authorize(&f.supervisor, op, Some(resource)), "{op:?}");
            assert!(gate.authorize(&f.admin, op, Some(resource)), "{op:?}");
            assert!(!gate.authorize(&f.user, op, Some(resource)), "{op:?}");
        }
    }

    #[test]
    fn test_non_member_rejected_everywhere() {
        let f = setup();
        let gate = PermissionGate::new(&f.roles, &f.delegations);
        let stranger = AccountId::new();
        for op in MANAGER_OPS.into_iter().chain(PARTICIPANT_OPS) {
            assert!(!gate.authorize(&stranger, op, Some(&eur())));
        }
    }

    #[test]
    fn test_delegated_supervisor_transfer() {
        let mut f = setup();
        f.delegations.set_auth(eur(), f.supervisor, true);
        let gate = PermissionGate::new(&f.roles, &f.delegations);

        assert!(gate.authorize(&f.supervisor, Operation::TransferToken, Some(&eur())));
        let usd = ResourceRef::Token(TokenSymbol::new("USD"));
        assert!(!gate.authorize(&f.supervisor, Operation::TransferToken, Some(&usd)));
        // Delegation only opens transfers
        assert!(!gate.authorize(&f.supervisor, Operation::MintToken, Some(&eur())));
    }

    #[test]
    fn test_stale_delegation_ignored_for_user() {
        let mut f = setup();
        f.delegations.set_auth(eur(), f.user, true);
        let gate = PermissionGate::new(&f.roles, &f.delegations);
        assert!(!gate.authorize(&f.user, Operation::TransferToken, Some(&eur())));
        assert!(!gate.is_delegated(&eur(), &f.user));
    }

    #[test]
    fn test_require_maps_to_not_authorized() {
        let f = setup();
        let gate = PermissionGate::new(&f.roles, &f.delegations);
        assert_eq!(
            gate.require(&f.user, Operation::CreateToken, None),
            Err(DaoError::NotAuthorized)
        );
        assert!(gate.require(&f.admin, Operation::CreateToken, None).is_ok());
    }

    #[test]
    fn test_check_grantee() {
        let f = setup();
        let gate = PermissionGate::new(&f.roles, &f.delegations);
        assert!(gate.check_grantee(&f.admin, &f.supervisor).is_ok());
        assert_eq!(
            gate.check_grantee(&f.admin, &f.user),
            Err(DaoError::NotAuthorized)
        );
        assert_eq!(
            gate.check_grantee(&f.admin, &AccountId::new()),
            Err(DaoError::NotAuthorized)
        );
        assert!(matches!(
            gate.check_grantee(&f.owner, &f.admin),
            Err(DaoError::InvalidArgument { .. })
        ));
        assert!(matches!(
            gate.check_grantee(&f.admin, &f.admin),
            Err(DaoError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_operation_serialization() {
        let json = serde_json::to_string(&Operation::ManageTokenAuth).unwrap();
        assert_eq!(json, "\"MANAGE_TOKEN_AUTH\"");
    }
}
