//! Membership — join, invite/accept, promote/accept-or-refuse, demote, kick
//!
//! Per-account states:
//! `NotMember → (join | acceptInvite) → Member(role)`
//! `Member → (modifyRank up) → PromotionPending → (accept → Member(new) | refuse → Member(old))`
//! `Member → (modifyRank down) → Member(lower)` immediately
//! `Member → (kick) → NotMember`
//!
//! Pending invites and promotion proposals are explicit records keyed by the
//! target account, at most one of each per account. Every operation either
//! fully applies or returns an error with no state touched.

use dao_types::ids::AccountId;
use dao_types::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::errors::DaoError;
use crate::events::{
    DaoEvent, InviteAccepted, InviteIssued, InviteOnlyChanged, MemberJoined, MemberKicked,
    PromotionAccepted, PromotionProposed, PromotionRefused, RankLowered,
};
use crate::roles::RoleRegistry;

/// Pending invitation addressed to a non-member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub role: Role,
    pub issuer: AccountId,
}

/// Pending promotion awaiting the target's consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionProposal {
    pub role: Role,
    pub proposer: AccountId,
}

/// Observable membership state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    NotMember,
    Member(Role),
    PromotionPending { current: Role, proposed: Role },
}

/// Two-phase membership protocol over a [`RoleRegistry`].
#[derive(Debug, Clone, Default)]
pub struct MembershipStateMachine {
    invites: HashMap<AccountId, Invite>,
    promotions: HashMap<AccountId, PromotionProposal>,
    invite_only: bool,
}

impl MembershipStateMachine {
    pub fn new(invite_only: bool) -> Self {
        Self {
            invites: HashMap::new(),
            promotions: HashMap::new(),
            invite_only,
        }
    }

    // ───────────────────────── Joining ─────────────────────────

    /// Self-service join as USER.
    ///
    /// Closed for everyone while the organization is invite-only; invited
    /// accounts go through `accept_invite` instead.
    pub fn join(&mut self, roles: &mut RoleRegistry, actor: AccountId) -> Result<DaoEvent, DaoError> {
        if roles.is_member(&actor) {
            return Err(DaoError::AlreadyMember);
        }
        if self.invite_only {
            return Err(DaoError::InviteOnlyRestricted);
        }
        if !roles.assign(actor, Role::User) {
            return Err(DaoError::NotAuthorized);
        }
        // A stale invite would otherwise outlive the membership it was meant to create
        self.invites.remove(&actor);

        info!(account = %actor, "Member joined");
        Ok(DaoEvent::MemberJoined(MemberJoined {
            account: actor,
            role: Role::User,
        }))
    }

    /// Invite a non-member at a role the issuer administers.
    ///
    /// Overwrites any invite already pending for the invitee.
    pub fn invite(
        &mut self,
        roles: &RoleRegistry,
        issuer: AccountId,
        invitee: AccountId,
        role: Role,
    ) -> Result<DaoEvent, DaoError> {
        if !roles.has_admin_rights(&issuer, role) {
            return Err(DaoError::NotAuthorized);
        }
        if roles.is_member(&invitee) {
            return Err(DaoError::AlreadyMember);
        }

        let previous = self.invites.insert(invitee, Invite { role, issuer });
        info!(
            issuer = %issuer,
            invitee = %invitee,
            role = %role,
            overwritten = previous.is_some(),
            "Invite issued"
        );
        Ok(DaoEvent::InviteIssued(InviteIssued {
            issuer,
            invitee,
            role,
        }))
    }

    /// Consume the pending invite and become a member at its role.
    ///
    /// The issuer must still administer the proposed role at this point.
    pub fn accept_invite(
        &mut self,
        roles: &mut RoleRegistry,
        actor: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        if roles.is_member(&actor) {
            return Err(DaoError::AlreadyMember);
        }
        let invite = *self.invites.get(&actor).ok_or(DaoError::NoPendingInvite)?;
        if !roles.has_admin_rights(&invite.issuer, invite.role) {
            return Err(DaoError::NotAuthorized);
        }
        if !roles.assign(actor, invite.role) {
            return Err(DaoError::NotAuthorized);
        }
        self.invites.remove(&actor);

        info!(account = %actor, role = %invite.role, issuer = %invite.issuer, "Invite accepted");
        Ok(DaoEvent::InviteAccepted(InviteAccepted {
            account: actor,
            issuer: invite.issuer,
            role: invite.role,
        }))
    }

    // ───────────────────────── Rank changes ─────────────────────────

    /// Change a member's rank.
    ///
    /// The caller must administer both the target's current role and the new
    /// role. Raising the rank only records a proposal; lowering applies at
    /// once and discards any pending proposal.
    pub fn modify_rank(
        &mut self,
        roles: &mut RoleRegistry,
        caller: AccountId,
        target: AccountId,
        new_role: Role,
    ) -> Result<DaoEvent, DaoError> {
        // Callers that administer no role learn nothing about the target
        if !roles.has_admin_rights(&caller, Role::User) {
            return Err(DaoError::NotAuthorized);
        }
        let current = roles.role_of(&target).ok_or(DaoError::NotAMember)?;
        if !roles.has_admin_rights(&caller, current) || !roles.has_admin_rights(&caller, new_role) {
            return Err(DaoError::NotAuthorized);
        }
        if new_role == current {
            return Err(DaoError::invalid(format!("{target} already holds {new_role}")));
        }

        if new_role > current {
            self.promotions.insert(
                target,
                PromotionProposal {
                    role: new_role,
                    proposer: caller,
                },
            );
            info!(proposer = %caller, target = %target, from = %current, to = %new_role, "Promotion proposed");
            return Ok(DaoEvent::PromotionProposed(PromotionProposed {
                proposer: caller,
                target,
                current,
                proposed: new_role,
            }));
        }

        if !roles.assign(target, new_role) {
            return Err(DaoError::NotAuthorized);
        }
        self.promotions.remove(&target);

        info!(caller = %caller, target = %target, from = %current, to = %new_role, "Rank lowered");
        Ok(DaoEvent::RankLowered(RankLowered {
            caller,
            target,
            previous: current,
            role: new_role,
        }))
    }

    /// Confirm the pending promotion.
    ///
    /// The proposer must still administer both roles involved.
    pub fn accept_promotion(
        &mut self,
        roles: &mut RoleRegistry,
        actor: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        let proposal = *self
            .promotions
            .get(&actor)
            .ok_or(DaoError::NoPendingPromotion)?;
        let current = roles.role_of(&actor).ok_or(DaoError::NotAMember)?;
        if !roles.has_admin_rights(&proposal.proposer, current)
            || !roles.has_admin_rights(&proposal.proposer, proposal.role)
        {
            return Err(DaoError::NotAuthorized);
        }
        if !roles.assign(actor, proposal.role) {
            return Err(DaoError::NotAuthorized);
        }
        self.promotions.remove(&actor);

        info!(target = %actor, from = %current, to = %proposal.role, "Promotion accepted");
        Ok(DaoEvent::PromotionAccepted(PromotionAccepted {
            target: actor,
            previous: current,
            role: proposal.role,
        }))
    }

    /// Decline the pending promotion; the role stays as it is.
    pub fn refuse_promotion(
        &mut self,
        roles: &RoleRegistry,
        actor: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        if !self.promotions.contains_key(&actor) {
            return Err(DaoError::NoPendingPromotion);
        }
        let current = roles.role_of(&actor).ok_or(DaoError::NotAMember)?;
        let proposal = self
            .promotions
            .remove(&actor)
            .ok_or(DaoError::NoPendingPromotion)?;

        info!(target = %actor, role = %current, declined = %proposal.role, "Promotion refused");
        Ok(DaoEvent::PromotionRefused(PromotionRefused {
            target: actor,
            role: current,
            declined: proposal.role,
        }))
    }

    // ───────────────────────── Removal ─────────────────────────

    /// Remove a member the caller administers, clearing its pending records.
    pub fn kick_member(
        &mut self,
        roles: &mut RoleRegistry,
        caller: AccountId,
        target: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        // Callers that administer no role learn nothing about the target
        if !roles.has_admin_rights(&caller, Role::User) {
            return Err(DaoError::NotAuthorized);
        }
        let current = roles.role_of(&target).ok_or(DaoError::NotAMember)?;
        if !roles.has_admin_rights(&caller, current) {
            return Err(DaoError::NotAuthorized);
        }
        roles.remove(&target).ok_or(DaoError::NotAuthorized)?;
        self.invites.remove(&target);
        self.promotions.remove(&target);

        info!(caller = %caller, target = %target, role = %current, "Member kicked");
        Ok(DaoEvent::MemberKicked(MemberKicked {
            caller,
            target,
            previous_role: current,
        }))
    }

    // ───────────────────────── Invite-only flag ─────────────────────────

    /// Open or close self-service joining. Owner-only.
    pub fn set_invite_only(
        &mut self,
        roles: &RoleRegistry,
        caller: AccountId,
        invite_only: bool,
    ) -> Result<DaoEvent, DaoError> {
        if !roles.has_role_at_least(&caller, Role::Owner) {
            return Err(DaoError::NotAuthorized);
        }
        self.invite_only = invite_only;

        info!(caller = %caller, invite_only, "Invite-only flag set");
        Ok(DaoEvent::InviteOnlyChanged(InviteOnlyChanged {
            caller,
            invite_only,
        }))
    }

    pub fn is_invite_only(&self) -> bool {
        self.invite_only
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn pending_invite(&self, account: &AccountId) -> Option<&Invite> {
        self.invites.get(account)
    }

    pub fn pending_promotion(&self, account: &AccountId) -> Option<&PromotionProposal> {
        self.promotions.get(account)
    }

    pub fn status(&self, roles: &RoleRegistry, account: &AccountId) -> MembershipStatus {
        match (roles.role_of(account), self.promotions.get(account)) {
            (None, _) => MembershipStatus::NotMember,
            (Some(current), Some(proposal)) => MembershipStatus::PromotionPending {
                current,
                proposed: proposal.role,
            },
            (Some(role), None) => MembershipStatus::Member(role),
        }
    }

    /// Pending invites ordered by invitee.
    pub fn invites(&self) -> Vec<(AccountId, Invite)> {
        let mut invites: Vec<_> = self.invites.iter().map(|(a, i)| (*a, *i)).collect();
        invites.sort_by_key(|(account, _)| *account);
        invites
    }

    /// Pending promotions ordered by target.
    pub fn promotions(&self) -> Vec<(AccountId, PromotionProposal)> {
        let mut promotions: Vec<_> = self.promotions.iter().map(|(a, p)| (*a, *p)).collect();
        promotions.sort_by_key(|(account, _)| *account);
        promotions
    }
}
