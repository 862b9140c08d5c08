//! Resources that can carry delegated management rights

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{CrowdsaleId, ExchangeId, TokenSymbol};

/// Kind of a delegable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    Token,
    Crowdsale,
    Exchange,
}

/// A concrete resource: kind plus its identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "UPPERCASE")]
pub enum ResourceRef {
    Token(TokenSymbol),
    Crowdsale(CrowdsaleId),
    Exchange(ExchangeId),
}

impl ResourceRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Token(_) => ResourceKind::Token,
            ResourceRef::Crowdsale(_) => ResourceKind::Crowdsale,
            ResourceRef::Exchange(_) => ResourceKind::Exchange,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Token(symbol) => write!(f, "token:{symbol}"),
            ResourceRef::Crowdsale(id) => write!(f, "crowdsale:{id}"),
            ResourceRef::Exchange(id) => write!(f, "exchange:{id}"),
        }
    }
}

impl From<TokenSymbol> for ResourceRef {
    fn from(symbol: TokenSymbol) -> Self {
        ResourceRef::Token(symbol)
    }
}

impl From<CrowdsaleId> for ResourceRef {
    fn from(id: CrowdsaleId) -> Self {
        ResourceRef::Crowdsale(id)
    }
}

impl From<ExchangeId> for ResourceRef {
    fn from(id: ExchangeId) -> Self {
        ResourceRef::Exchange(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind() {
        assert_eq!(ResourceRef::from(TokenSymbol::new("EUR")).kind(), ResourceKind::Token);
        assert_eq!(ResourceRef::from(CrowdsaleId::new()).kind(), ResourceKind::Crowdsale);
        assert_eq!(ResourceRef::from(ExchangeId::new()).kind(), ResourceKind::Exchange);
    }

    #[test]
    fn test_resource_ref_serialization() {
        let resource = ResourceRef::Token(TokenSymbol::new("EUR"));
        let json = serde_json::to_string(&resource).unwrap();
        assert_eq!(json, r#"{"kind":"TOKEN","id":"EUR"}"#);
        let back: ResourceRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_resource_ref_display() {
        let resource = ResourceRef::Token(TokenSymbol::new("EUR"));
        assert_eq!(resource.to_string(), "token:EUR");
    }
}
