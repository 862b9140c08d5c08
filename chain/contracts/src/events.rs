//! Contract events
//!
//! Events are immutable records emitted by successful governance operations.
//! Rejected calls never emit.

use dao_types::ids::AccountId;
use dao_types::resource::ResourceRef;
use dao_types::role::Role;
use serde::{Deserialize, Serialize};

use crate::gate::Operation;

/// Account joined freely as USER
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberJoined {
    pub account: AccountId,
    pub role: Role,
}

/// Invite created or overwritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteIssued {
    pub issuer: AccountId,
    pub invitee: AccountId,
    pub role: Role,
}

/// Invite consumed; the invitee is now a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteAccepted {
    pub account: AccountId,
    pub issuer: AccountId,
    pub role: Role,
}

/// First phase of a promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionProposed {
    pub proposer: AccountId,
    pub target: AccountId,
    pub current: Role,
    pub proposed: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionAccepted {
    pub target: AccountId,
    pub previous: Role,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRefused {
    pub target: AccountId,
    pub role: Role,
    pub declined: Role,
}

/// Single-phase demotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLowered {
    pub caller: AccountId,
    pub target: AccountId,
    pub previous: Role,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberKicked {
    pub caller: AccountId,
    pub target: AccountId,
    pub previous_role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteOnlyChanged {
    pub caller: AccountId,
    pub invite_only: bool,
}

/// Delegated management right granted or revoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationChanged {
    pub caller: AccountId,
    pub resource: ResourceRef,
    pub delegate: AccountId,
    pub authorized: bool,
}

/// Gated operation accepted by the collaborator it was forwarded to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationForwarded {
    pub caller: AccountId,
    pub operation: Operation,
    pub resource: Option<ResourceRef>,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoEvent {
    MemberJoined(MemberJoined),
    InviteIssued(InviteIssued),
    InviteAccepted(InviteAccepted),
    PromotionProposed(PromotionProposed),
    PromotionAccepted(PromotionAccepted),
    PromotionRefused(PromotionRefused),
    RankLowered(RankLowered),
    MemberKicked(MemberKicked),
    InviteOnlyChanged(InviteOnlyChanged),
    DelegationChanged(DelegationChanged),
    OperationForwarded(OperationForwarded),
}
