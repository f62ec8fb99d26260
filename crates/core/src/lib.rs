//! # HubSpot Sync Core
//!
//! Pure sync logic - no HTTP or configuration loading.
//!
//! This crate contains:
//! - The `HubSpotApi` port the infrastructure client implements
//! - The pagination token codec and the user status scan state
//! - Resource mappers and the per-kind resource syncers
//! - Grant / revoke planning for team and role membership
//! - The `HubSpotConnector` facade the orchestrator drives
//!
//! ## Architecture Principles
//! - Only depends on `hubspot-sync-domain`
//! - All remote access goes through [`ports::HubSpotApi`]
//! - No background work and no internal retries; every call is a single
//!   request/response honouring the caller's [`CallContext`]

pub mod connector;
pub mod context;
pub mod pagination;
pub mod ports;
pub mod provisioning;
pub mod sync;
pub mod user_status;

// Re-export specific items to avoid ambiguity
pub use connector::{ConnectorMetadata, HubSpotConnector};
pub use context::CallContext;
pub use pagination::{Bag, PageState};
pub use ports::{ApiPage, ApiResponse, HubSpotApi};
pub use provisioning::TeamMembership;
pub use sync::{
    AccountSyncer, ResourceProvisioner, ResourceSyncer, RoleSyncer, TeamSyncer, UserSyncer,
};
pub use user_status::{DeletedUserRegistry, SyncPhase, UsersPageToken};
