//! # HubSpot Sync Domain
//!
//! Business domain types and models for the HubSpot connector.
//!
//! This crate contains:
//! - Remote HubSpot records (Account, User, Team, Role) and the partial
//!   update payload
//! - The normalized resource / entitlement / grant model
//! - Typed profiles with their flat-map adapters
//! - Domain error types and Result definitions
//! - Connector configuration
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
