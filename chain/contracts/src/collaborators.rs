//! External collaborators
//!
//! The token ledger, crowdsale factory and exchange factory are opaque
//! services. The organization only decides authorization and forwards; it
//! acts on them through its own account.

use chrono::{DateTime, Utc};
use dao_types::ids::{AccountId, CrowdsaleId, ExchangeId, TokenSymbol};
use dao_types::numeric::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorError;
use crate::in_memory::{InMemoryCrowdsaleFactory, InMemoryExchangeFactory, InMemoryTokenLedger};

/// Parameters of a new fungible token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: TokenSymbol,
    pub decimals: u8,
    pub logo_url: String,
    pub logo_hash: String,
    /// Maximum supply; `None` is uncapped.
    pub hard_cap: Option<Amount>,
    pub contract_hash: String,
}

impl TokenSpec {
    /// Minimal spec with empty metadata and no cap.
    pub fn new(name: impl Into<String>, symbol: TokenSymbol, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol,
            decimals,
            logo_url: String::new(),
            logo_hash: String::new(),
            hard_cap: None,
            contract_hash: String::new(),
        }
    }
}

/// Parameters of a new crowdsale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdsaleSpec {
    /// Token distributed to contributors.
    pub token_to_give: TokenSymbol,
    /// Token contributors pay with.
    pub accepted_coin: TokenSymbol,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Units of `accepted_coin` per `give_ratio` units of `token_to_give`.
    pub accept_ratio: Amount,
    pub give_ratio: Amount,
    pub max_cap: Amount,
    pub title: String,
    pub description: String,
}

/// Peer-to-peer exchange offer. `offered_*` and `required_*` are parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeOffer {
    pub offered_coins: Vec<TokenSymbol>,
    pub required_coins: Vec<TokenSymbol>,
    pub offered_amounts: Vec<Amount>,
    pub required_amounts: Vec<Amount>,
    pub repeats: u32,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrowdsaleStatus {
    /// Created, not yet funded
    Locked,
    /// Accepting contributions
    Open,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExchangeStatus {
    Active,
    Cancelled,
    /// All repeats consumed
    Exhausted,
}

/// Fungible-token ledger.
pub trait TokenLedger: Send {
    fn create_token(&mut self, owner: AccountId, spec: &TokenSpec) -> Result<(), CollaboratorError>;

    /// Mint `amount` into the minter's balance.
    fn mint(&mut self, minter: AccountId, symbol: &TokenSymbol, amount: Amount) -> Result<(), CollaboratorError>;

    fn transfer(
        &mut self,
        from: AccountId,
        symbol: &TokenSymbol,
        amount: Amount,
        to: AccountId,
    ) -> Result<(), CollaboratorError>;

    fn balance_of(&self, holder: &AccountId, symbol: &TokenSymbol) -> Decimal;
}

/// Crowdsale factory and lifecycle.
pub trait CrowdsaleFactory: Send {
    fn create(&mut self, owner: AccountId, spec: &CrowdsaleSpec) -> Result<CrowdsaleId, CollaboratorError>;

    /// Fund the crowdsale with `amount` of its token and open it.
    fn unlock(&mut self, id: CrowdsaleId, funder: AccountId, amount: Amount) -> Result<(), CollaboratorError>;

    fn stop(&mut self, id: CrowdsaleId) -> Result<(), CollaboratorError>;

    fn join(
        &mut self,
        id: CrowdsaleId,
        participant: AccountId,
        amount: Amount,
        symbol: &TokenSymbol,
    ) -> Result<(), CollaboratorError>;

    fn refund(&mut self, id: CrowdsaleId, participant: AccountId, amount: Amount) -> Result<(), CollaboratorError>;

    fn set_manager(&mut self, id: CrowdsaleId, manager: AccountId, enabled: bool) -> Result<(), CollaboratorError>;

    fn status(&self, id: &CrowdsaleId) -> Option<CrowdsaleStatus>;

    fn is_manager(&self, id: &CrowdsaleId, account: &AccountId) -> bool;
}

/// Exchange (escrow) factory and lifecycle.
pub trait ExchangeFactory: Send {
    fn create(&mut self, owner: AccountId, offer: &ExchangeOffer) -> Result<ExchangeId, CollaboratorError>;

    fn cancel(&mut self, id: ExchangeId) -> Result<(), CollaboratorError>;

    fn renew(&mut self, id: ExchangeId) -> Result<(), CollaboratorError>;

    fn accept(
        &mut self,
        id: ExchangeId,
        taker: AccountId,
        coins: &[TokenSymbol],
        amounts: &[Amount],
        repeats: u32,
    ) -> Result<(), CollaboratorError>;

    fn refill(
        &mut self,
        id: ExchangeId,
        coins: &[TokenSymbol],
        amounts: &[Amount],
        repeats: u32,
    ) -> Result<(), CollaboratorError>;

    fn set_manager(&mut self, id: ExchangeId, manager: AccountId, enabled: bool) -> Result<(), CollaboratorError>;

    fn status(&self, id: &ExchangeId) -> Option<ExchangeStatus>;

    fn is_manager(&self, id: &ExchangeId, account: &AccountId) -> bool;
}

/// The services an organization forwards to.
pub struct Collaborators {
    pub tokens: Box<dyn TokenLedger>,
    pub crowdsales: Box<dyn CrowdsaleFactory>,
    pub exchanges: Box<dyn ExchangeFactory>,
}

impl Collaborators {
    pub fn new(
        tokens: Box<dyn TokenLedger>,
        crowdsales: Box<dyn CrowdsaleFactory>,
        exchanges: Box<dyn ExchangeFactory>,
    ) -> Self {
        Self {
            tokens,
            crowdsales,
            exchanges,
        }
    }

    /// Self-contained in-memory services.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(InMemoryTokenLedger::new()),
            Box::new(InMemoryCrowdsaleFactory::new()),
            Box::new(InMemoryExchangeFactory::new()),
        )
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
