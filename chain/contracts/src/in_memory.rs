//! In-memory collaborators
//!
//! Self-contained token ledger, crowdsale factory and exchange factory used
//! by tests and local wiring. Balances are tracked as
//! `HashMap<AccountId, HashMap<TokenSymbol, Decimal>>` with checked
//! arithmetic; each call validates fully before mutating.

use dao_types::ids::{AccountId, CrowdsaleId, ExchangeId, TokenSymbol};
use dao_types::numeric::Amount;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::collaborators::{
    CrowdsaleFactory, CrowdsaleSpec, CrowdsaleStatus, ExchangeFactory, ExchangeOffer,
    ExchangeStatus, TokenLedger, TokenSpec,
};
use crate::errors::CollaboratorError;

fn rejected(reason: &str) -> CollaboratorError {
    CollaboratorError::Rejected {
        reason: reason.to_string(),
    }
}

// ───────────────────────── Token ledger ─────────────────────────

#[derive(Debug, Clone)]
struct TokenRecord {
    owner: AccountId,
    hard_cap: Option<Amount>,
    supply: Decimal,
}

/// Token ledger keeping balances in memory.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    tokens: HashMap<TokenSymbol, TokenRecord>,
    balances: HashMap<AccountId, HashMap<TokenSymbol, Decimal>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self, symbol: &TokenSymbol) -> Option<Decimal> {
        self.tokens.get(symbol).map(|t| t.supply)
    }

    fn token(&self, symbol: &TokenSymbol) -> Result<&TokenRecord, CollaboratorError> {
        self.tokens
            .get(symbol)
            .ok_or_else(|| CollaboratorError::UnknownToken {
                symbol: symbol.to_string(),
            })
    }

    /// Credit with overflow protection.
    fn safe_credit(
        &mut self,
        holder: AccountId,
        symbol: &TokenSymbol,
        amount: Decimal,
    ) -> Result<(), CollaboratorError> {
        let current = self
            .balances
            .entry(holder)
            .or_default()
            .entry(symbol.clone())
            .or_insert(Decimal::ZERO);
        *current = current
            .checked_add(amount)
            .ok_or(CollaboratorError::Overflow)?;
        Ok(())
    }

    /// Debit with underflow protection.
    fn safe_debit(
        &mut self,
        holder: &AccountId,
        symbol: &TokenSymbol,
        amount: Decimal,
    ) -> Result<(), CollaboratorError> {
        let available = self.balance_of(holder, symbol);
        if available < amount {
            return Err(CollaboratorError::InsufficientBalance {
                asset: symbol.to_string(),
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        let current = self
            .balances
            .get_mut(holder)
            .and_then(|assets| assets.get_mut(symbol))
            .ok_or(CollaboratorError::Overflow)?;
        *current = current
            .checked_sub(amount)
            .ok_or(CollaboratorError::Overflow)?;
        Ok(())
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn create_token(&mut self, owner: AccountId, spec: &TokenSpec) -> Result<(), CollaboratorError> {
        if self.tokens.contains_key(&spec.symbol) {
            return Err(CollaboratorError::DuplicateToken {
                symbol: spec.symbol.to_string(),
            });
        }
        self.tokens.insert(
            spec.symbol.clone(),
            TokenRecord {
                owner,
                hard_cap: spec.hard_cap,
                supply: Decimal::ZERO,
            },
        );
        Ok(())
    }

    fn mint(&mut self, minter: AccountId, symbol: &TokenSymbol, amount: Amount) -> Result<(), CollaboratorError> {
        let token = self.token(symbol)?;
        if token.owner != minter {
            return Err(rejected("only the token owner can mint"));
        }
        let supply = token
            .supply
            .checked_add(amount.value())
            .ok_or(CollaboratorError::Overflow)?;
        if token.hard_cap.map_or(false, |cap| supply > cap.value()) {
            return Err(rejected("hard cap exceeded"));
        }
        // Check the credit cannot overflow before touching supply
        self.balance_of(&minter, symbol)
            .checked_add(amount.value())
            .ok_or(CollaboratorError::Overflow)?;

        self.safe_credit(minter, symbol, amount.value())?;
        if let Some(token) = self.tokens.get_mut(symbol) {
            token.supply = supply;
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        from: AccountId,
        symbol: &TokenSymbol,
        amount: Amount,
        to: AccountId,
    ) -> Result<(), CollaboratorError> {
        self.token(symbol)?;
        if from != to {
            self.balance_of(&to, symbol)
                .checked_add(amount.value())
                .ok_or(CollaboratorError::Overflow)?;
        }
        self.safe_debit(&from, symbol, amount.value())?;
        self.safe_credit(to, symbol, amount.value())
    }

    fn balance_of(&self, holder: &AccountId, symbol: &TokenSymbol) -> Decimal {
        self.balances
            .get(holder)
            .and_then(|assets| assets.get(symbol))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

// ───────────────────────── Crowdsales ─────────────────────────

#[derive(Debug, Clone)]
struct CrowdsaleRecord {
    spec: CrowdsaleSpec,
    owner: AccountId,
    status: CrowdsaleStatus,
    funded: Decimal,
    raised: Decimal,
    contributions: HashMap<AccountId, Decimal>,
    managers: HashSet<AccountId>,
}

/// Crowdsale factory keeping every crowdsale in memory.
#[derive(Debug, Default)]
pub struct InMemoryCrowdsaleFactory {
    crowdsales: HashMap<CrowdsaleId, CrowdsaleRecord>,
}

impl InMemoryCrowdsaleFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contribution(&self, id: &CrowdsaleId, participant: &AccountId) -> Decimal {
        self.crowdsales
            .get(id)
            .and_then(|c| c.contributions.get(participant))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn funded(&self, id: &CrowdsaleId) -> Option<Decimal> {
        self.crowdsales.get(id).map(|c| c.funded)
    }

    fn record(&mut self, id: CrowdsaleId) -> Result<&mut CrowdsaleRecord, CollaboratorError> {
        self.crowdsales
            .get_mut(&id)
            .ok_or_else(|| CollaboratorError::UnknownCrowdsale { id: id.to_string() })
    }
}

impl CrowdsaleFactory for InMemoryCrowdsaleFactory {
    fn create(&mut self, owner: AccountId, spec: &CrowdsaleSpec) -> Result<CrowdsaleId, CollaboratorError> {
        let id = CrowdsaleId::new();
        self.crowdsales.insert(
            id,
            CrowdsaleRecord {
                spec: spec.clone(),
                owner,
                status: CrowdsaleStatus::Locked,
                funded: Decimal::ZERO,
                raised: Decimal::ZERO,
                contributions: HashMap::new(),
                managers: HashSet::new(),
            },
        );
        Ok(id)
    }

    fn unlock(&mut self, id: CrowdsaleId, funder: AccountId, amount: Amount) -> Result<(), CollaboratorError> {
        let crowdsale = self.record(id)?;
        if crowdsale.owner != funder {
            return Err(rejected("only the crowdsale owner can unlock"));
        }
        if crowdsale.status != CrowdsaleStatus::Locked {
            return Err(rejected("crowdsale is not locked"));
        }
        crowdsale.funded = amount.value();
        crowdsale.status = CrowdsaleStatus::Open;
        Ok(())
    }

    fn stop(&mut self, id: CrowdsaleId) -> Result<(), CollaboratorError> {
        let crowdsale = self.record(id)?;
        if crowdsale.status == CrowdsaleStatus::Stopped {
            return Err(rejected("crowdsale already stopped"));
        }
        crowdsale.status = CrowdsaleStatus::Stopped;
        Ok(())
    }

    fn join(
        &mut self,
        id: CrowdsaleId,
        participant: AccountId,
        amount: Amount,
        symbol: &TokenSymbol,
    ) -> Result<(), CollaboratorError> {
        let crowdsale = self.record(id)?;
        if crowdsale.status != CrowdsaleStatus::Open {
            return Err(rejected("crowdsale is not open"));
        }
        if *symbol != crowdsale.spec.accepted_coin {
            return Err(rejected("coin not accepted by this crowdsale"));
        }
        let raised = crowdsale
            .raised
            .checked_add(amount.value())
            .ok_or(CollaboratorError::Overflow)?;
        if raised > crowdsale.spec.max_cap.value() {
            return Err(rejected("max cap exceeded"));
        }
        crowdsale.raised = raised;
        *crowdsale.contributions.entry(participant).or_insert(Decimal::ZERO) += amount.value();
        Ok(())
    }

    fn refund(&mut self, id: CrowdsaleId, participant: AccountId, amount: Amount) -> Result<(), CollaboratorError> {
        let crowdsale = self.record(id)?;
        let contributed = crowdsale
            .contributions
            .get(&participant)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if contributed < amount.value() {
            return Err(CollaboratorError::InsufficientBalance {
                asset: crowdsale.spec.accepted_coin.to_string(),
                required: amount.to_string(),
                available: contributed.to_string(),
            });
        }
        crowdsale.contributions.insert(participant, contributed - amount.value());
        crowdsale.raised -= amount.value();
        Ok(())
    }

    fn set_manager(&mut self, id: CrowdsaleId, manager: AccountId, enabled: bool) -> Result<(), CollaboratorError> {
        let crowdsale = self.record(id)?;
        if enabled {
            crowdsale.managers.insert(manager);
        } else {
            crowdsale.managers.remove(&manager);
        }
        Ok(())
    }

    fn status(&self, id: &CrowdsaleId) -> Option<CrowdsaleStatus> {
        self.crowdsales.get(id).map(|c| c.status)
    }

    fn is_manager(&self, id: &CrowdsaleId, account: &AccountId) -> bool {
        self.crowdsales
            .get(id)
            .map_or(false, |c| c.managers.contains(account))
    }
}

// ───────────────────────── Exchanges ─────────────────────────

#[derive(Debug, Clone)]
struct ExchangeRecord {
    offer: ExchangeOffer,
    owner: AccountId,
    status: ExchangeStatus,
    remaining: u32,
    managers: HashSet<AccountId>,
}

/// Exchange factory keeping every offer in memory.
#[derive(Debug, Default)]
pub struct InMemoryExchangeFactory {
    exchanges: HashMap<ExchangeId, ExchangeRecord>,
}

impl InMemoryExchangeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_repeats(&self, id: &ExchangeId) -> Option<u32> {
        self.exchanges.get(id).map(|e| e.remaining)
    }

    fn record(&mut self, id: ExchangeId) -> Result<&mut ExchangeRecord, CollaboratorError> {
        self.exchanges
            .get_mut(&id)
            .ok_or_else(|| CollaboratorError::UnknownExchange { id: id.to_string() })
    }
}

impl ExchangeFactory for InMemoryExchangeFactory {
    fn create(&mut self, owner: AccountId, offer: &ExchangeOffer) -> Result<ExchangeId, CollaboratorError> {
        let id = ExchangeId::new();
        self.exchanges.insert(
            id,
            ExchangeRecord {
                offer: offer.clone(),
                owner,
                status: ExchangeStatus::Active,
                remaining: offer.repeats,
                managers: HashSet::new(),
            },
        );
        Ok(id)
    }

    fn cancel(&mut self, id: ExchangeId) -> Result<(), CollaboratorError> {
        let exchange = self.record(id)?;
        if exchange.status == ExchangeStatus::Cancelled {
            return Err(rejected("exchange already cancelled"));
        }
        exchange.status = ExchangeStatus::Cancelled;
        Ok(())
    }

    fn renew(&mut self, id: ExchangeId) -> Result<(), CollaboratorError> {
        let exchange = self.record(id)?;
        if exchange.status == ExchangeStatus::Active {
            return Err(rejected("exchange already active"));
        }
        if exchange.remaining == 0 {
            exchange.remaining = exchange.offer.repeats;
        }
        exchange.status = ExchangeStatus::Active;
        Ok(())
    }

    fn accept(
        &mut self,
        id: ExchangeId,
        taker: AccountId,
        coins: &[TokenSymbol],
        amounts: &[Amount],
        repeats: u32,
    ) -> Result<(), CollaboratorError> {
        let exchange = self.record(id)?;
        if exchange.owner == taker {
            return Err(rejected("cannot accept own exchange"));
        }
        if exchange.status != ExchangeStatus::Active {
            return Err(rejected("exchange is not active"));
        }
        if coins != exchange.offer.required_coins.as_slice()
            || amounts != exchange.offer.required_amounts.as_slice()
        {
            return Err(rejected("payment does not match required coins"));
        }
        if repeats > exchange.remaining {
            return Err(rejected("not enough repeats left"));
        }
        exchange.remaining -= repeats;
        if exchange.remaining == 0 {
            exchange.status = ExchangeStatus::Exhausted;
        }
        Ok(())
    }

    fn refill(
        &mut self,
        id: ExchangeId,
        coins: &[TokenSymbol],
        amounts: &[Amount],
        repeats: u32,
    ) -> Result<(), CollaboratorError> {
        let exchange = self.record(id)?;
        if exchange.status == ExchangeStatus::Cancelled {
            return Err(rejected("exchange is cancelled"));
        }
        if coins != exchange.offer.offered_coins.as_slice()
            || amounts != exchange.offer.offered_amounts.as_slice()
        {
            return Err(rejected("refill does not match offered coins"));
        }
        exchange.remaining = exchange
            .remaining
            .checked_add(repeats)
            .ok_or(CollaboratorError::Overflow)?;
        exchange.status = ExchangeStatus::Active;
        Ok(())
    }

    fn set_manager(&mut self, id: ExchangeId, manager: AccountId, enabled: bool) -> Result<(), CollaboratorError> {
        let exchange = self.record(id)?;
        if enabled {
            exchange.managers.insert(manager);
        } else {
            exchange.managers.remove(&manager);
        }
        Ok(())
    }

    fn status(&self, id: &ExchangeId) -> Option<ExchangeStatus> {
        self.exchanges.get(id).map(|e| e.status)
    }

    fn is_manager(&self, id: &ExchangeId, account: &AccountId) -> bool {
        self.exchanges
            .get(id)
            .map_or(false, |e| e.managers.contains(account))
    }
}
