//! Governance contract logic for a DAO
//!
//! This crate implements the governance ledger of a single organization:
//! a four-level role hierarchy, consent-based membership, per-resource
//! delegation of management rights, and a permission gate in front of every
//! token, crowdsale and exchange operation the organization forwards.
//!
//! # Modules
//! - `roles`: Role registry (account → role, fixed owner)
//! - `membership`: Join / invite / promote / demote / kick state machine
//! - `delegation`: Per-resource delegated admin rights
//! - `gate`: Authorization decisions for gated operations
//! - `organization`: Ledger owner and operation dispatcher
//! - `collaborators`: Token, crowdsale and exchange service interfaces
//! - `in_memory`: In-memory collaborator implementations
//! - `commitment`: Canonical snapshots and state root
//! - `config`: Organization configuration
//! - `events`: Contract events
//! - `errors`: Contract-specific error types
//!
//! # Version
//! v0.1.0 — Initial implementation

pub mod collaborators;
pub mod commitment;
pub mod config;
pub mod delegation;
pub mod errors;
pub mod events;
pub mod gate;
pub mod in_memory;
pub mod membership;
pub mod organization;
pub mod roles;

pub use errors::DaoError;
pub use organization::Organization;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
