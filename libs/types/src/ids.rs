//! Unique identifier types for DAO entities
//!
//! Accounts, crowdsales and exchanges use UUID v7 so identifiers sort by
//! creation time. Tokens are addressed by their ticker symbol.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identity of an account acting on the organization.
///
/// Every entry point receives the caller as an `AccountId`; the organization
/// itself also owns one, used when it acts on collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Create a new AccountId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a crowdsale, assigned by the crowdsale factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrowdsaleId(Uuid);

impl CrowdsaleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CrowdsaleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CrowdsaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an exchange offer, assigned by the exchange factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticker symbol of a fungible token (e.g. "EUR")
///
/// Symbols are non-empty and contain no whitespace, on every construction
/// path including deserialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenSymbol(String);

/// Error raised when parsing an invalid [`TokenSymbol`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid token symbol: {0:?}")]
pub struct InvalidSymbol(pub String);

impl TokenSymbol {
    /// Create a new TokenSymbol
    ///
    /// # Panics
    /// Panics if the symbol is empty or contains whitespace
    pub fn new(symbol: impl Into<String>) -> Self {
        let s = symbol.into();
        assert!(Self::is_valid(&s), "TokenSymbol must be non-empty without whitespace");
        Self(s)
    }

    /// Try to create a TokenSymbol, returning None if invalid
    pub fn try_new(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into();
        if Self::is_valid(&s) {
            Some(Self(s))
        } else {
            None
        }
    }

    /// Get the symbol string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(s: &str) -> bool {
        !s.is_empty() && !s.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TokenSymbol {
    type Error = InvalidSymbol;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidSymbol(value))
        }
    }
}

impl From<TokenSymbol> for String {
    fn from(symbol: TokenSymbol) -> Self {
        symbol.0
    }
}

impl From<&str> for TokenSymbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_creation() {
        let id1 = AccountId::new();
        let id2 = AccountId::new();
        assert_ne!(id1, id2, "AccountIds should be unique");
    }

    #[test]
    fn test_account_id_serialization() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_crowdsale_and_exchange_ids_unique() {
        assert_ne!(CrowdsaleId::new(), CrowdsaleId::new());
        assert_ne!(ExchangeId::new(), ExchangeId::new());
    }

    #[test]
    fn test_token_symbol_creation() {
        let symbol = TokenSymbol::new("EUR");
        assert_eq!(symbol.as_str(), "EUR");
        assert_eq!(symbol.to_string(), "EUR");
    }

    #[test]
    fn test_token_symbol_try_new() {
        assert!(TokenSymbol::try_new("EUR").is_some());
        assert!(TokenSymbol::try_new("").is_none());
        assert!(TokenSymbol::try_new("E UR").is_none());
    }

    #[test]
    #[should_panic(expected = "TokenSymbol must be non-empty without whitespace")]
    fn test_token_symbol_invalid_format() {
        TokenSymbol::new("");
    }

    #[test]
    fn test_token_symbol_serialization() {
        let symbol = TokenSymbol::new("EUR");
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"EUR\"");
        let back: TokenSymbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symbol);
    }

    #[test]
    fn test_token_symbol_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<TokenSymbol>("\"\"").is_err());
        assert!(serde_json::from_str::<TokenSymbol>("\" \"").is_err());
        assert!(serde_json::from_str::<TokenSymbol>("\"E UR\"").is_err());
    }

    #[test]
    fn test_token_symbol_try_from_string() {
        assert!(TokenSymbol::try_from("USD".to_string()).is_ok());
        assert_eq!(
            TokenSymbol::try_from(String::new()),
            Err(InvalidSymbol(String::new()))
        );
    }
}
