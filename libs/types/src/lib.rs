//! Types library for the DAO governance ledger
//!
//! This library provides the shared vocabulary used by the governance
//! contract and its collaborators: identities, the role hierarchy,
//! delegable resources and token amounts.
//!
//! # Version
//! v1.0.0 - Frozen
//!
//! # Modules
//! - `ids`: Unique identifiers (AccountId, CrowdsaleId, ExchangeId, TokenSymbol)
//! - `role`: Role hierarchy and its admin chain
//! - `resource`: Resources carrying delegated management rights
//! - `numeric`: Strictly positive token amounts

// Public modules
pub mod ids;
pub mod numeric;
pub mod resource;
pub mod role;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::resource::*;
    pub use crate::role::*;
}
