//! Organization — the governance ledger and its operation dispatcher
//!
//! Owns the role registry, the membership state machine, the delegation
//! registry and the collaborator services. Every gated entry point checks
//! the caller through [`PermissionGate`], validates its arguments, forwards
//! to the collaborator and only then records local state and events. A
//! collaborator failure leaves the ledger exactly as it was.

use chrono::{DateTime, Utc};
use dao_types::ids::{AccountId, CrowdsaleId, ExchangeId, TokenSymbol};
use dao_types::numeric::Amount;
use dao_types::resource::ResourceRef;
use dao_types::role::{Role, RoleAdmin};
use tracing::{debug, info, warn};

use crate::collaborators::{Collaborators, CrowdsaleSpec, ExchangeOffer, TokenSpec};
use crate::commitment::LedgerSnapshot;
use crate::config::OrganizationConfig;
use crate::delegation::DelegatedAdminRegistry;
use crate::errors::DaoError;
use crate::events::{DaoEvent, DelegationChanged, OperationForwarded};
use crate::gate::{Operation, PermissionGate};
use crate::membership::{Invite, MembershipStateMachine, MembershipStatus, PromotionProposal};
use crate::roles::RoleRegistry;

fn log_rejection(action: &'static str, caller: &AccountId, err: DaoError) -> DaoError {
    debug!(action, caller = %caller, error = %err, "Call rejected");
    err
}

/// A single DAO: members, roles, delegations and the services it manages.
#[derive(Debug)]
pub struct Organization {
    /// Identity the organization acts as towards its collaborators
    address: AccountId,
    name: String,
    roles: RoleRegistry,
    membership: MembershipStateMachine,
    delegations: DelegatedAdminRegistry,
    collaborators: Collaborators,
    /// Emitted events log (append-only)
    events: Vec<DaoEvent>,
}

impl Organization {
    pub fn new(
        owner: AccountId,
        config: OrganizationConfig,
        collaborators: Collaborators,
    ) -> Result<Self, DaoError> {
        config.validate()?;
        Ok(Self::assemble(owner, config, collaborators))
    }

    /// Default configuration backed by in-memory collaborators.
    pub fn in_memory(owner: AccountId) -> Self {
        Self::assemble(owner, OrganizationConfig::default(), Collaborators::in_memory())
    }

    fn assemble(owner: AccountId, config: OrganizationConfig, collaborators: Collaborators) -> Self {
        let address = AccountId::new();
        info!(
            name = %config.name,
            owner = %owner,
            address = %address,
            invite_only = config.invite_only,
            "Organization created"
        );
        Self {
            address,
            name: config.name,
            roles: RoleRegistry::new(owner),
            membership: MembershipStateMachine::new(config.invite_only),
            delegations: DelegatedAdminRegistry::new(),
            collaborators,
            events: Vec::new(),
        }
    }

    // ───────────────────────── Membership ─────────────────────────

    pub fn join(&mut self, caller: AccountId) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .join(&mut self.roles, caller)
            .map_err(|err| log_rejection("join", &caller, err))?;
        Ok(self.record(event))
    }

    pub fn invite(
        &mut self,
        caller: AccountId,
        invitee: AccountId,
        role: Role,
    ) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .invite(&self.roles, caller, invitee, role)
            .map_err(|err| log_rejection("invite", &caller, err))?;
        Ok(self.record(event))
    }

    pub fn accept_invite(&mut self, caller: AccountId) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .accept_invite(&mut self.roles, caller)
            .map_err(|err| log_rejection("accept_invite", &caller, err))?;
        Ok(self.record(event))
    }

    /// Promote (pending consent) or demote (immediate) a member.
    ///
    /// A demotion drops every delegated right the target held.
    pub fn modify_rank(
        &mut self,
        caller: AccountId,
        target: AccountId,
        role: Role,
    ) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .modify_rank(&mut self.roles, caller, target, role)
            .map_err(|err| log_rejection("modify_rank", &caller, err))?;
        if matches!(event, DaoEvent::RankLowered(_)) {
            self.revoke_delegations(&target);
        }
        Ok(self.record(event))
    }

    /// Accept the pending promotion. Delegations held at the old rank lapse.
    pub fn accept_promotion(&mut self, caller: AccountId) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .accept_promotion(&mut self.roles, caller)
            .map_err(|err| log_rejection("accept_promotion", &caller, err))?;
        self.revoke_delegations(&caller);
        Ok(self.record(event))
    }

    pub fn refuse_promotion(&mut self, caller: AccountId) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .refuse_promotion(&self.roles, caller)
            .map_err(|err| log_rejection("refuse_promotion", &caller, err))?;
        Ok(self.record(event))
    }

    pub fn kick_member(&mut self, caller: AccountId, target: AccountId) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .kick_member(&mut self.roles, caller, target)
            .map_err(|err| log_rejection("kick_member", &caller, err))?;
        self.revoke_delegations(&target);
        Ok(self.record(event))
    }

    pub fn set_invite_only(&mut self, caller: AccountId, invite_only: bool) -> Result<DaoEvent, DaoError> {
        let event = self
            .membership
            .set_invite_only(&self.roles, caller, invite_only)
            .map_err(|err| log_rejection("set_invite_only", &caller, err))?;
        Ok(self.record(event))
    }

    // ───────────────────────── Tokens ─────────────────────────

    pub fn create_token(&mut self, caller: AccountId, spec: TokenSpec) -> Result<DaoEvent, DaoError> {
        self.gate().require(&caller, Operation::CreateToken, None)?;
        if spec.name.trim().is_empty() {
            return Err(DaoError::invalid("token name must not be empty"));
        }
        self.collaborators
            .tokens
            .create_token(self.address, &spec)
            .inspect_err(|err| warn!(symbol = %spec.symbol, error = %err, "Token creation failed"))?;

        info!(caller = %caller, symbol = %spec.symbol, name = %spec.name, "Token created");
        Ok(self.forwarded(caller, Operation::CreateToken, Some(ResourceRef::Token(spec.symbol))))
    }

    pub fn mint_token(
        &mut self,
        caller: AccountId,
        symbol: TokenSymbol,
        amount: Amount,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Token(symbol.clone());
        self.gate().require(&caller, Operation::MintToken, Some(&resource))?;
        self.collaborators.tokens.mint(self.address, &symbol, amount)?;

        info!(caller = %caller, symbol = %symbol, amount = %amount, "Token minted");
        Ok(self.forwarded(caller, Operation::MintToken, Some(resource)))
    }

    /// Move `amount` of the organization's `symbol` balance to `to`.
    ///
    /// Open to ADMIN and above, and to a SUPERVISOR delegated on `symbol`.
    pub fn transfer_token(
        &mut self,
        caller: AccountId,
        symbol: TokenSymbol,
        amount: Amount,
        to: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Token(symbol.clone());
        self.gate().require(&caller, Operation::TransferToken, Some(&resource))?;
        self.collaborators
            .tokens
            .transfer(self.address, &symbol, amount, to)?;

        info!(caller = %caller, symbol = %symbol, amount = %amount, to = %to, "Token transferred");
        Ok(self.forwarded(caller, Operation::TransferToken, Some(resource)))
    }

    pub fn set_token_auth(
        &mut self,
        caller: AccountId,
        symbol: TokenSymbol,
        delegate: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        self.gate().require(&caller, Operation::ManageTokenAuth, None)?;
        self.gate().check_grantee(&caller, &delegate)?;
        Ok(self.set_delegation(caller, ResourceRef::Token(symbol), delegate, true))
    }

    /// Clear a transfer delegation.
    ///
    /// Idempotent: revoking an entry that was never granted succeeds and
    /// still records a `DelegationChanged { authorized: false }` event, so
    /// every accepted call leaves exactly one event.
    pub fn remove_token_auth(
        &mut self,
        caller: AccountId,
        symbol: TokenSymbol,
        delegate: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        self.gate().require(&caller, Operation::ManageTokenAuth, None)?;
        Ok(self.set_delegation(caller, ResourceRef::Token(symbol), delegate, false))
    }

    /// Whether `delegate` currently holds transfer rights on `symbol`.
    pub fn get_token_auth(&self, symbol: &TokenSymbol, delegate: &AccountId) -> bool {
        self.gate()
            .is_delegated(&ResourceRef::Token(symbol.clone()), delegate)
    }

    // ───────────────────────── Crowdsales ─────────────────────────

    pub fn create_crowdsale(
        &mut self,
        caller: AccountId,
        spec: CrowdsaleSpec,
    ) -> Result<CrowdsaleId, DaoError> {
        self.gate().require(&caller, Operation::CreateCrowdsale, None)?;
        if spec.end <= spec.start {
            return Err(DaoError::invalid("crowdsale must end after it starts"));
        }
        if spec.token_to_give == spec.accepted_coin {
            return Err(DaoError::invalid("crowdsale cannot accept the token it gives"));
        }
        let id = self.collaborators.crowdsales.create(self.address, &spec)?;

        info!(caller = %caller, crowdsale = %id, token = %spec.token_to_give, "Crowdsale created");
        self.forwarded(caller, Operation::CreateCrowdsale, Some(ResourceRef::Crowdsale(id)));
        Ok(id)
    }

    /// Fund the crowdsale with `amount` of its token and open it.
    pub fn unlock_crowdsale(
        &mut self,
        caller: AccountId,
        id: CrowdsaleId,
        amount: Amount,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Crowdsale(id);
        self.gate().require(&caller, Operation::UnlockCrowdsale, Some(&resource))?;
        self.collaborators.crowdsales.unlock(id, self.address, amount)?;

        info!(caller = %caller, crowdsale = %id, amount = %amount, "Crowdsale unlocked");
        Ok(self.forwarded(caller, Operation::UnlockCrowdsale, Some(resource)))
    }

    pub fn stop_crowdsale(&mut self, caller: AccountId, id: CrowdsaleId) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Crowdsale(id);
        self.gate().require(&caller, Operation::StopCrowdsale, Some(&resource))?;
        self.collaborators.crowdsales.stop(id)?;

        info!(caller = %caller, crowdsale = %id, "Crowdsale stopped");
        Ok(self.forwarded(caller, Operation::StopCrowdsale, Some(resource)))
    }

    /// Contribute `amount` of `symbol` on behalf of the organization.
    pub fn join_crowdsale(
        &mut self,
        caller: AccountId,
        id: CrowdsaleId,
        amount: Amount,
        symbol: TokenSymbol,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Crowdsale(id);
        self.gate().require(&caller, Operation::JoinCrowdsale, Some(&resource))?;
        self.collaborators
            .crowdsales
            .join(id, self.address, amount, &symbol)?;

        info!(caller = %caller, crowdsale = %id, amount = %amount, symbol = %symbol, "Crowdsale joined");
        Ok(self.forwarded(caller, Operation::JoinCrowdsale, Some(resource)))
    }

    pub fn refund_me_crowdsale(
        &mut self,
        caller: AccountId,
        id: CrowdsaleId,
        amount: Amount,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Crowdsale(id);
        self.gate().require(&caller, Operation::RefundCrowdsale, Some(&resource))?;
        self.collaborators.crowdsales.refund(id, self.address, amount)?;

        info!(caller = %caller, crowdsale = %id, amount = %amount, "Crowdsale refunded");
        Ok(self.forwarded(caller, Operation::RefundCrowdsale, Some(resource)))
    }

    pub fn make_admin_crowdsale(
        &mut self,
        caller: AccountId,
        id: CrowdsaleId,
        delegate: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        self.set_crowdsale_manager(caller, id, delegate, true)
    }

    pub fn remove_admin_crowdsale(
        &mut self,
        caller: AccountId,
        id: CrowdsaleId,
        delegate: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        self.set_crowdsale_manager(caller, id, delegate, false)
    }

    pub fn get_crowdsale_management(&self, id: &CrowdsaleId, delegate: &AccountId) -> bool {
        self.gate().is_delegated(&ResourceRef::Crowdsale(*id), delegate)
    }

    fn set_crowdsale_manager(
        &mut self,
        caller: AccountId,
        id: CrowdsaleId,
        delegate: AccountId,
        enabled: bool,
    ) -> Result<DaoEvent, DaoError> {
        self.gate().require(&caller, Operation::ManageCrowdsaleAdmin, None)?;
        if enabled {
            self.gate().check_grantee(&caller, &delegate)?;
        }
        self.collaborators
            .crowdsales
            .set_manager(id, delegate, enabled)
            .inspect_err(|err| warn!(crowdsale = %id, delegate = %delegate, error = %err, "Manager update refused"))?;
        Ok(self.set_delegation(caller, ResourceRef::Crowdsale(id), delegate, enabled))
    }

    // ───────────────────────── Exchanges ─────────────────────────

    /// Open an exchange offer. `now` bounds the expiration from below.
    pub fn create_exchange(
        &mut self,
        caller: AccountId,
        offer: ExchangeOffer,
        now: DateTime<Utc>,
    ) -> Result<ExchangeId, DaoError> {
        self.gate().require(&caller, Operation::CreateExchange, None)?;
        check_legs(&offer.offered_coins, &offer.offered_amounts, offer.repeats)?;
        check_legs(&offer.required_coins, &offer.required_amounts, offer.repeats)?;
        if offer.expiration <= now {
            return Err(DaoError::invalid("exchange expiration must be in the future"));
        }
        let id = self.collaborators.exchanges.create(self.address, &offer)?;

        info!(caller = %caller, exchange = %id, repeats = offer.repeats, "Exchange created");
        self.forwarded(caller, Operation::CreateExchange, Some(ResourceRef::Exchange(id)));
        Ok(id)
    }

    pub fn cancel_exchange(&mut self, caller: AccountId, id: ExchangeId) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Exchange(id);
        self.gate().require(&caller, Operation::CancelExchange, Some(&resource))?;
        self.collaborators.exchanges.cancel(id)?;

        info!(caller = %caller, exchange = %id, "Exchange cancelled");
        Ok(self.forwarded(caller, Operation::CancelExchange, Some(resource)))
    }

    pub fn renew_exchange(&mut self, caller: AccountId, id: ExchangeId) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Exchange(id);
        self.gate().require(&caller, Operation::RenewExchange, Some(&resource))?;
        self.collaborators.exchanges.renew(id)?;

        info!(caller = %caller, exchange = %id, "Exchange renewed");
        Ok(self.forwarded(caller, Operation::RenewExchange, Some(resource)))
    }

    /// Take `repeats` rounds of someone else's offer, paying from the
    /// organization's balance.
    pub fn accept_exchange(
        &mut self,
        caller: AccountId,
        id: ExchangeId,
        coins: &[TokenSymbol],
        amounts: &[Amount],
        repeats: u32,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Exchange(id);
        self.gate().require(&caller, Operation::AcceptExchange, Some(&resource))?;
        check_legs(coins, amounts, repeats)?;
        self.collaborators
            .exchanges
            .accept(id, self.address, coins, amounts, repeats)?;

        info!(caller = %caller, exchange = %id, repeats, "Exchange accepted");
        Ok(self.forwarded(caller, Operation::AcceptExchange, Some(resource)))
    }

    pub fn refill_exchange(
        &mut self,
        caller: AccountId,
        id: ExchangeId,
        coins: &[TokenSymbol],
        amounts: &[Amount],
        repeats: u32,
    ) -> Result<DaoEvent, DaoError> {
        let resource = ResourceRef::Exchange(id);
        self.gate().require(&caller, Operation::RefillExchange, Some(&resource))?;
        check_legs(coins, amounts, repeats)?;
        self.collaborators
            .exchanges
            .refill(id, coins, amounts, repeats)?;

        info!(caller = %caller, exchange = %id, repeats, "Exchange refilled");
        Ok(self.forwarded(caller, Operation::RefillExchange, Some(resource)))
    }

    pub fn make_admin_exchange(
        &mut self,
        caller: AccountId,
        id: ExchangeId,
        delegate: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        self.set_exchange_manager(caller, id, delegate, true)
    }

    pub fn remove_admin_exchange(
        &mut self,
        caller: AccountId,
        id: ExchangeId,
        delegate: AccountId,
    ) -> Result<DaoEvent, DaoError> {
        self.set_exchange_manager(caller, id, delegate, false)
    }

    pub fn get_exchange_management(&self, id: &ExchangeId, delegate: &AccountId) -> bool {
        self.gate().is_delegated(&ResourceRef::Exchange(*id), delegate)
    }

    fn set_exchange_manager(
        &mut self,
        caller: AccountId,
        id: ExchangeId,
        delegate: AccountId,
        enabled: bool,
    ) -> Result<DaoEvent, DaoError> {
        self.gate().require(&caller, Operation::ManageExchangeAdmin, None)?;
        if enabled {
            self.gate().check_grantee(&caller, &delegate)?;
        }
        self.collaborators
            .exchanges
            .set_manager(id, delegate, enabled)
            .inspect_err(|err| warn!(exchange = %id, delegate = %delegate, error = %err, "Manager update refused"))?;
        Ok(self.set_delegation(caller, ResourceRef::Exchange(id), delegate, enabled))
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn owner(&self) -> AccountId {
        self.roles.owner()
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current settings, with the live invite-only flag.
    pub fn config(&self) -> OrganizationConfig {
        OrganizationConfig {
            name: self.name.clone(),
            invite_only: self.is_invite_only(),
        }
    }

    pub fn is_invite_only(&self) -> bool {
        self.membership.is_invite_only()
    }

    /// Exact role match.
    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn get_role_admin(&self, role: Role) -> RoleAdmin {
        RoleRegistry::admin_role_of(role)
    }

    pub fn role_of(&self, account: &AccountId) -> Option<Role> {
        self.roles.role_of(account)
    }

    pub fn is_member(&self, account: &AccountId) -> bool {
        self.roles.is_member(account)
    }

    pub fn members(&self) -> Vec<(AccountId, Role)> {
        self.roles.members()
    }

    pub fn pending_invite(&self, account: &AccountId) -> Option<&Invite> {
        self.membership.pending_invite(account)
    }

    pub fn pending_promotion(&self, account: &AccountId) -> Option<&PromotionProposal> {
        self.membership.pending_promotion(account)
    }

    pub fn membership_status(&self, account: &AccountId) -> MembershipStatus {
        self.membership.status(&self.roles, account)
    }

    pub fn delegations(&self) -> &DelegatedAdminRegistry {
        &self.delegations
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Canonical copy of the governance state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::capture(&self.roles, &self.membership, &self.delegations)
    }

    /// SHA-256 commitment to the current governance state.
    pub fn state_root(&self) -> [u8; 32] {
        self.snapshot().digest()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[DaoEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn gate(&self) -> PermissionGate<'_> {
        PermissionGate::new(&self.roles, &self.delegations)
    }

    fn record(&mut self, event: DaoEvent) -> DaoEvent {
        self.events.push(event.clone());
        event
    }

    fn forwarded(
        &mut self,
        caller: AccountId,
        operation: Operation,
        resource: Option<ResourceRef>,
    ) -> DaoEvent {
        self.record(DaoEvent::OperationForwarded(OperationForwarded {
            caller,
            operation,
            resource,
        }))
    }

    /// Store the entry and record its event, whether or not the stored
    /// value changed.
    fn set_delegation(
        &mut self,
        caller: AccountId,
        resource: ResourceRef,
        delegate: AccountId,
        authorized: bool,
    ) -> DaoEvent {
        let changed = self.delegations.set_auth(resource.clone(), delegate, authorized);
        info!(
            caller = %caller,
            resource = %resource,
            delegate = %delegate,
            authorized,
            changed,
            "Delegation updated"
        );
        self.record(DaoEvent::DelegationChanged(DelegationChanged {
            caller,
            resource,
            delegate,
            authorized,
        }))
    }

    /// Drop the delegations held by `account` after its role changed.
    ///
    /// Crowdsale and exchange entries are withdrawn on the collaborator
    /// first and dropped locally only when it confirms. A refused entry
    /// stays recorded and dormant behind the live role check until an
    /// explicit `remove_admin_*` clears it on both sides.
    fn revoke_delegations(&mut self, account: &AccountId) {
        let mut removed = 0usize;
        for resource in self.delegations.grants_for(account) {
            let relayed = match &resource {
                ResourceRef::Token(_) => Ok(()),
                ResourceRef::Crowdsale(id) => {
                    self.collaborators.crowdsales.set_manager(*id, *account, false)
                }
                ResourceRef::Exchange(id) => {
                    self.collaborators.exchanges.set_manager(*id, *account, false)
                }
            };
            match relayed {
                Ok(()) => {
                    self.delegations.set_auth(resource, *account, false);
                    removed += 1;
                }
                Err(err) => {
                    warn!(account = %account, resource = %resource, error = %err, "Manager withdrawal refused, entry kept");
                }
            }
        }
        if removed > 0 {
            info!(account = %account, removed, "Delegations revoked after role change");
        }
    }
}

/// Coins and amounts of one exchange leg must pair up and be non-empty.
fn check_legs(coins: &[TokenSymbol], amounts: &[Amount], repeats: u32) -> Result<(), DaoError> {
    if coins.is_empty() {
        return Err(DaoError::invalid("no coins given"));
    }
    if coins.len() != amounts.len() {
        return Err(DaoError::invalid(format!(
            "{} coins but {} amounts",
            coins.len(),
            amounts.len()
        )));
    }
    if repeats == 0 {
        return Err(DaoError::invalid("repeats must be at least 1"));
    }
    Ok(())
}
