//! Domain types and models
//!
//! - [`hubspot`]: records as the HubSpot API returns them
//! - [`resource`]: the normalized resource / entitlement / grant model
//! - [`profile`]: typed profiles and their flat scalar map adapters

pub mod hubspot;
pub mod profile;
pub mod resource;

pub use hubspot::{Account, Role, Team, User, UserUpdate};
pub use profile::{
    AccountProfile, ProfileAdapter, ProfileMap, ProfileValue, RoleProfile, TeamProfile,
    UserProfile,
};
pub use resource::{
    Annotation, Annotations, Entitlement, EntitlementPurpose, Grant, Page, RateLimitInfo,
    Resource, ResourceId, ResourceKind, ResourceTrait, ResourceType, TraitDetails, UserEmail,
    UserStatus, UserTrait,
};
