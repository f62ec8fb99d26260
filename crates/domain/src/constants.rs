//! Connector constants
//!
//! Centralized location for the API defaults and entitlement slugs shared by
//! the sync engine and its adapters.

// API defaults
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com/";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Idle time after which an abandoned user scan lineage is evicted.
pub const DEFAULT_SCAN_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

// Connector metadata
pub const CONNECTOR_DISPLAY_NAME: &str = "HubSpot";
pub const CONNECTOR_DESCRIPTION: &str =
    "Syncs HubSpot accounts, users, teams and roles and provisions team and role membership";

// Entitlement slugs
pub const MEMBER_ENTITLEMENT: &str = "member";
pub const PRIMARY_MEMBER_ENTITLEMENT: &str = "primary-member";
pub const SECONDARY_MEMBER_ENTITLEMENT: &str = "secondary-member";

// Profiles serialize id lists as a single scalar
pub const PROFILE_LIST_SEPARATOR: char = ',';
