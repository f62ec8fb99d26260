//! In-memory mock for the `HubSpotApi` port
//!
//! Pages are served by offset: the cursor handed back is the index of the
//! next item, so tests can assert on exact cursors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use hubspot_sync_core::{ApiPage, ApiResponse, CallContext, HubSpotApi};
use hubspot_sync_domain::{
    Account, ConnectorError, RateLimitInfo, Result as DomainResult, Role, Team, User, UserUpdate,
};
use parking_lot::Mutex;

#[derive(Default)]
struct MockState {
    account: Account,
    users: Vec<User>,
    deactivated: Vec<String>,
    teams: Vec<Team>,
    roles: Vec<Role>,
    rate_limit: RateLimitInfo,
    failures: HashMap<&'static str, ConnectorError>,
    calls: HashMap<&'static str, usize>,
    updates: Vec<(String, UserUpdate)>,
    cursors: Vec<(&'static str, String)>,
}

/// Mock HubSpot that records calls and update payloads.
#[derive(Default, Clone)]
pub struct MockHubSpotApi {
    state: Arc<Mutex<MockState>>,
}

impl MockHubSpotApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, id: i64) -> Self {
        self.state.lock().account = Account { id, account_type: "STANDARD".into() };
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state.lock().users = users;
        self
    }

    pub fn with_deactivated(self, ids: &[&str]) -> Self {
        self.state.lock().deactivated = ids.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_teams(self, teams: Vec<Team>) -> Self {
        self.state.lock().teams = teams;
        self
    }

    pub fn with_roles(self, roles: Vec<Role>) -> Self {
        self.state.lock().roles = roles;
        self
    }

    pub fn with_rate_limit(self, rate_limit: RateLimitInfo) -> Self {
        self.state.lock().rate_limit = rate_limit;
        self
    }

    /// Make every call of `operation` fail with `error`.
    pub fn fail(self, operation: &'static str, error: ConnectorError) -> Self {
        self.state.lock().failures.insert(operation, error);
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn updates(&self) -> Vec<(String, UserUpdate)> {
        self.state.lock().updates.clone()
    }

    /// Cursors passed to paginated calls, in call order.
    pub fn cursors(&self, operation: &str) -> Vec<String> {
        self.state
            .lock()
            .cursors
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, cursor)| cursor.clone())
            .collect()
    }

    fn enter(&self, ctx: &CallContext, operation: &'static str) -> DomainResult<RateLimitInfo> {
        ctx.check()?;
        let mut state = self.state.lock();
        *state.calls.entry(operation).or_default() += 1;
        match state.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(state.rate_limit.clone()),
        }
    }

    fn page<T: Clone>(
        &self,
        operation: &'static str,
        items: &[T],
        limit: u32,
        after: &str,
        rate_limit: RateLimitInfo,
    ) -> DomainResult<ApiPage<T>> {
        self.state.lock().cursors.push((operation, after.to_string()));

        let start = if after.is_empty() {
            0
        } else {
            after
                .parse::<usize>()
                .map_err(|_| ConnectorError::Http { status: 400, rate_limit: rate_limit.clone() })?
        };
        let start = start.min(items.len());
        let end = (start + limit as usize).min(items.len());
        let next = if end < items.len() { end.to_string() } else { String::new() };

        Ok(ApiPage::new(items[start..end].to_vec(), next, rate_limit))
    }
}

#[async_trait]
impl HubSpotApi for MockHubSpotApi {
    async fn get_account(&self, ctx: &CallContext) -> DomainResult<ApiResponse<Account>> {
        let rate_limit = self.enter(ctx, "get_account")?;
        Ok(ApiResponse::new(self.state.lock().account.clone(), rate_limit))
    }

    async fn get_users(
        &self,
        ctx: &CallContext,
        limit: u32,
        after: &str,
    ) -> DomainResult<ApiPage<User>> {
        let rate_limit = self.enter(ctx, "get_users")?;
        let users = self.state.lock().users.clone();
        self.page("get_users", &users, limit, after, rate_limit)
    }

    async fn get_user(&self, ctx: &CallContext, user_id: &str) -> DomainResult<ApiResponse<User>> {
        let rate_limit = self.enter(ctx, "get_user")?;
        let user = self.state.lock().users.iter().find(|u| u.id == user_id).cloned();
        match user {
            Some(user) => Ok(ApiResponse::new(user, rate_limit)),
            None => Err(ConnectorError::Http { status: 404, rate_limit }),
        }
    }

    async fn get_teams(&self, ctx: &CallContext) -> DomainResult<ApiResponse<Vec<Team>>> {
        let rate_limit = self.enter(ctx, "get_teams")?;
        Ok(ApiResponse::new(self.state.lock().teams.clone(), rate_limit))
    }

    async fn get_roles(&self, ctx: &CallContext) -> DomainResult<ApiResponse<Vec<Role>>> {
        let rate_limit = self.enter(ctx, "get_roles")?;
        Ok(ApiResponse::new(self.state.lock().roles.clone(), rate_limit))
    }

    async fn update_user(
        &self,
        ctx: &CallContext,
        user_id: &str,
        update: &UserUpdate,
    ) -> DomainResult<RateLimitInfo> {
        let rate_limit = self.enter(ctx, "update_user")?;
        self.state.lock().updates.push((user_id.to_string(), update.clone()));
        Ok(rate_limit)
    }

    async fn search_deactivated_users(
        &self,
        ctx: &CallContext,
        limit: u32,
        after: &str,
    ) -> DomainResult<ApiPage<String>> {
        let rate_limit = self.enter(ctx, "search_deactivated_users")?;
        let ids = self.state.lock().deactivated.clone();
        self.page("search_deactivated_users", &ids, limit, after, rate_limit)
    }
}
