//! State commitment — deterministic ledger snapshots and their digest
//!
//! A snapshot captures every piece of governance state (members, pending
//! records, delegations, invite-only flag) in a canonical order, so two
//! ledgers with the same state produce the same SHA-256 root.

use dao_types::ids::AccountId;
use dao_types::resource::ResourceRef;
use dao_types::role::Role;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::delegation::DelegatedAdminRegistry;
use crate::membership::{Invite, MembershipStateMachine, PromotionProposal};
use crate::roles::RoleRegistry;

/// Canonical, serializable copy of the governance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub owner: AccountId,
    pub invite_only: bool,
    pub members: Vec<(AccountId, Role)>,
    pub invites: Vec<(AccountId, Invite)>,
    pub promotions: Vec<(AccountId, PromotionProposal)>,
    pub delegations: Vec<(ResourceRef, AccountId)>,
}

impl LedgerSnapshot {
    pub fn capture(
        roles: &RoleRegistry,
        membership: &MembershipStateMachine,
        delegations: &DelegatedAdminRegistry,
    ) -> Self {
        Self {
            owner: roles.owner(),
            invite_only: membership.is_invite_only(),
            members: roles.members(),
            invites: membership.invites(),
            promotions: membership.promotions(),
            delegations: delegations.entries(),
        }
    }

    /// SHA-256 over the canonical encoding. Fields are length-prefixed so
    /// distinct states cannot collide by concatenation.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        put(&mut hasher, self.owner.as_uuid().as_bytes());
        put(&mut hasher, &[u8::from(self.invite_only)]);

        put(&mut hasher, &(self.members.len() as u64).to_le_bytes());
        for (account, role) in &self.members {
            put(&mut hasher, account.as_uuid().as_bytes());
            put(&mut hasher, role.name().as_bytes());
        }

        put(&mut hasher, &(self.invites.len() as u64).to_le_bytes());
        for (account, invite) in &self.invites {
            put(&mut hasher, account.as_uuid().as_bytes());
            put(&mut hasher, invite.role.name().as_bytes());
            put(&mut hasher, invite.issuer.as_uuid().as_bytes());
        }

        put(&mut hasher, &(self.promotions.len() as u64).to_le_bytes());
        for (account, proposal) in &self.promotions {
            put(&mut hasher, account.as_uuid().as_bytes());
            put(&mut hasher, proposal.role.name().as_bytes());
            put(&mut hasher, proposal.proposer.as_uuid().as_bytes());
        }

        put(&mut hasher, &(self.delegations.len() as u64).to_le_bytes());
        for (resource, account) in &self.delegations {
            match resource {
                ResourceRef::Token(symbol) => {
                    put(&mut hasher, b"TOKEN");
                    put(&mut hasher, symbol.as_str().as_bytes());
                }
                ResourceRef::Crowdsale(id) => {
                    put(&mut hasher, b"CROWDSALE");
                    put(&mut hasher, id.as_uuid().as_bytes());
                }
                ResourceRef::Exchange(id) => {
                    put(&mut hasher, b"EXCHANGE");
                    put(&mut hasher, id.as_uuid().as_bytes());
                }
            }
            put(&mut hasher, account.as_uuid().as_bytes());
        }

        hasher.finalize().into()
    }
}

fn put(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
