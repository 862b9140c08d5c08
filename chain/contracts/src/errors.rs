//! Contract-specific error types
//!
//! Every rejected call leaves the ledger untouched; errors are synchronous
//! and never retried internally.

use thiserror::Error;

/// Errors raised by governance entry points
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DaoError {
    #[error("Not authorized")]
    NotAuthorized,

    #[error("Account is already a member")]
    AlreadyMember,

    #[error("Account is not a member")]
    NotAMember,

    #[error("No pending invite for account")]
    NoPendingInvite,

    #[error("No pending promotion for account")]
    NoPendingPromotion,

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Organization is invite-only")]
    InviteOnlyRestricted,

    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DaoError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        DaoError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Failures reported by the token, crowdsale and exchange services
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Unknown token: {symbol}")]
    UnknownToken { symbol: String },

    #[error("Token already exists: {symbol}")]
    DuplicateToken { symbol: String },

    #[error("Unknown crowdsale: {id}")]
    UnknownCrowdsale { id: String },

    #[error("Unknown exchange: {id}")]
    UnknownExchange { id: String },

    #[error("Insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Rejected: {reason}")]
    Rejected { reason: String },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    #[error("Organization name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dao_error_display() {
        let err = DaoError::InvalidArgument {
            reason: "mismatched lengths".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid argument: mismatched lengths");
        assert_eq!(DaoError::NotAuthorized.to_string(), "Not authorized");
    }

    #[test]
    fn test_collaborator_error_display() {
        let err = CollaboratorError::UnknownToken {
            symbol: "EUR".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown token: EUR");
    }

    #[test]
    fn test_dao_error_from_collaborator() {
        let err: DaoError = CollaboratorError::Overflow.into();
        assert!(matches!(err, DaoError::Collaborator(_)));
    }

    #[test]
    fn test_dao_error_from_config() {
        let err: DaoError = ConfigError::EmptyName.into();
        assert_eq!(err, DaoError::Config(ConfigError::EmptyName));
    }
}
