//! # HubSpot Sync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The shared reqwest-based HTTP client
//! - The HubSpot REST adapter implementing `HubSpotApi`
//! - Rate-limit header extraction
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `hubspot-sync-core`
//! - Depends on `hubspot-sync-domain` and `hubspot-sync-core`
//! - Contains all "impure" code (network and file I/O)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::hubspot::HubSpotClient;
