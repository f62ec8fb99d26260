//! Port the HubSpot HTTP client implements
//!
//! The syncers only ever talk to HubSpot through [`HubSpotApi`], which keeps
//! them testable against an in-memory mock.

use async_trait::async_trait;
use hubspot_sync_domain::{Account, RateLimitInfo, Result, Role, Team, User, UserUpdate};

use crate::context::CallContext;

/// A decoded response together with the rate-limit state of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub rate_limit: RateLimitInfo,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, rate_limit: RateLimitInfo) -> Self {
        Self { data, rate_limit }
    }
}

/// One cursor-paginated page.
///
/// `next_cursor` is empty on the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPage<T> {
    pub items: Vec<T>,
    pub next_cursor: String,
    pub rate_limit: RateLimitInfo,
}

impl<T> ApiPage<T> {
    pub fn new(items: Vec<T>, next_cursor: impl Into<String>, rate_limit: RateLimitInfo) -> Self {
        Self { items, next_cursor: next_cursor.into(), rate_limit }
    }
}

/// Typed access to the HubSpot endpoints the connector needs.
///
/// Every call is a single request. Implementations must honour the
/// cancellation and deadline of `ctx`, must never retry on their own, and
/// must surface any status >= 300 as `ConnectorError::Http` with the
/// rate-limit state of that response.
#[async_trait]
pub trait HubSpotApi: Send + Sync {
    /// Account details for the token's portal.
    async fn get_account(&self, ctx: &CallContext) -> Result<ApiResponse<Account>>;

    /// One page of users. An empty `after` starts from the first page.
    async fn get_users(&self, ctx: &CallContext, limit: u32, after: &str)
        -> Result<ApiPage<User>>;

    /// A single user. A missing user is `Http { status: 404, .. }`.
    async fn get_user(&self, ctx: &CallContext, user_id: &str) -> Result<ApiResponse<User>>;

    /// All teams in a single response.
    async fn get_teams(&self, ctx: &CallContext) -> Result<ApiResponse<Vec<Team>>>;

    /// All roles in a single response. Portals without role support answer
    /// with an error or an empty list.
    async fn get_roles(&self, ctx: &CallContext) -> Result<ApiResponse<Vec<Role>>>;

    /// Apply a partial update to a user.
    async fn update_user(
        &self,
        ctx: &CallContext,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<RateLimitInfo>;

    /// One page of ids of deactivated users from the CRM users search.
    async fn search_deactivated_users(
        &self,
        ctx: &CallContext,
        limit: u32,
        after: &str,
    ) -> Result<ApiPage<String>>;
}
