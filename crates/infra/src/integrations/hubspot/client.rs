//! HubSpot API client

use async_trait::async_trait;
use hubspot_sync_core::{ApiPage, ApiResponse, CallContext, HubSpotApi};
use hubspot_sync_domain::{
    Account, ConnectorConfig, ConnectorError, RateLimitInfo, Result, Role, Team, User, UserUpdate,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::models::{RolesResponse, SearchRequest, SearchResponse, TeamsResponse, UsersResponse};
use super::rate_limit::extract_rate_limit;
use crate::errors::InfraError;
use crate::http::HttpClient;

const USERS_PATH: &str = "settings/v3/users";
const TEAMS_PATH: &str = "settings/v3/users/teams";
const ROLES_PATH: &str = "settings/v3/users/roles";
const ACCOUNT_PATH: &str = "account-info/v3/details";
const USER_SEARCH_PATH: &str = "crm/v3/objects/users/search";

const USER_AGENT: &str = concat!("hubspot-sync/", env!("CARGO_PKG_VERSION"));

/// Bearer-authenticated client for the HubSpot settings, account-info and
/// CRM search endpoints.
///
/// Every method issues exactly one request. Any status >= 300 becomes
/// [`ConnectorError::Http`] carrying the rate-limit headers of that response;
/// the body of a failed response is never read.
#[derive(Clone)]
pub struct HubSpotClient {
    http: HttpClient,
    base_url: Url,
    access_token: String,
}

impl std::fmt::Debug for HubSpotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubSpotClient")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl HubSpotClient {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    /// `ConnectorError::Config` when the configuration is invalid, or the
    /// error of building the underlying HTTP client.
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Self::with_http_client(config, http)
    }

    /// Build a client around an existing [`HttpClient`].
    ///
    /// # Errors
    /// `ConnectorError::Config` when the base URL does not parse.
    pub fn with_http_client(config: &ConnectorConfig, http: HttpClient) -> Result<Self> {
        Ok(Self {
            http,
            base_url: normalize_base_url(&config.base_url)?,
            access_token: config.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ConnectorError::InvalidInput(format!("invalid endpoint {path}: {e}")))
    }

    fn user_endpoint(&self, user_id: &str) -> Result<Url> {
        let mut url = self.endpoint(USERS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ConnectorError::Config("base URL cannot carry a path".into()))?
            .push(user_id);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.access_token)
    }

    /// Send the request and turn a non-success status into an error.
    async fn send(
        &self,
        ctx: &CallContext,
        builder: RequestBuilder,
    ) -> Result<(Response, RateLimitInfo)> {
        let response = ctx.run(self.http.send(builder)).await?;
        let rate_limit = extract_rate_limit(response.headers());

        let status = response.status().as_u16();
        if status >= 300 {
            debug!(status, "HubSpot request rejected");
            return Err(ConnectorError::Http { status, rate_limit });
        }

        Ok((response, rate_limit))
    }

    async fn fetch<T>(&self, ctx: &CallContext, builder: RequestBuilder) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let (response, rate_limit) = self.send(ctx, builder).await?;

        let body = ctx
            .run(async {
                response.bytes().await.map_err(|e| ConnectorError::from(InfraError::from(e)))
            })
            .await?;
        let data =
            serde_json::from_slice(&body).map_err(|e| ConnectorError::from(InfraError::from(e)))?;

        Ok(ApiResponse::new(data, rate_limit))
    }
}

#[async_trait]
impl HubSpotApi for HubSpotClient {
    #[instrument(skip_all)]
    async fn get_account(&self, ctx: &CallContext) -> Result<ApiResponse<Account>> {
        let url = self.endpoint(ACCOUNT_PATH)?;
        self.fetch(ctx, self.request(Method::GET, url)).await
    }

    #[instrument(skip(self, ctx))]
    async fn get_users(
        &self,
        ctx: &CallContext,
        limit: u32,
        after: &str,
    ) -> Result<ApiPage<User>> {
        let url = self.endpoint(USERS_PATH)?;
        let mut builder = self.request(Method::GET, url);
        if limit != 0 {
            builder = builder.query(&[("limit", limit.to_string())]);
        }
        if !after.is_empty() {
            builder = builder.query(&[("after", after)]);
        }

        let response: ApiResponse<UsersResponse> = self.fetch(ctx, builder).await?;
        let next_cursor = response.data.next_cursor();
        Ok(ApiPage::new(response.data.results, next_cursor, response.rate_limit))
    }

    #[instrument(skip(self, ctx))]
    async fn get_user(&self, ctx: &CallContext, user_id: &str) -> Result<ApiResponse<User>> {
        let url = self.user_endpoint(user_id)?;
        self.fetch(ctx, self.request(Method::GET, url)).await
    }

    #[instrument(skip_all)]
    async fn get_teams(&self, ctx: &CallContext) -> Result<ApiResponse<Vec<Team>>> {
        let url = self.endpoint(TEAMS_PATH)?;
        let response: ApiResponse<TeamsResponse> =
            self.fetch(ctx, self.request(Method::GET, url)).await?;
        Ok(ApiResponse::new(response.data.results, response.rate_limit))
    }

    #[instrument(skip_all)]
    async fn get_roles(&self, ctx: &CallContext) -> Result<ApiResponse<Vec<Role>>> {
        let url = self.endpoint(ROLES_PATH)?;
        let response: ApiResponse<RolesResponse> =
            self.fetch(ctx, self.request(Method::GET, url)).await?;
        Ok(ApiResponse::new(response.data.results, response.rate_limit))
    }

    #[instrument(skip(self, ctx, update))]
    async fn update_user(
        &self,
        ctx: &CallContext,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<RateLimitInfo> {
        let url = self.user_endpoint(user_id)?;
        let (_, rate_limit) = self.send(ctx, self.request(Method::PUT, url).json(update)).await?;
        Ok(rate_limit)
    }

    #[instrument(skip(self, ctx))]
    async fn search_deactivated_users(
        &self,
        ctx: &CallContext,
        limit: u32,
        after: &str,
    ) -> Result<ApiPage<String>> {
        let url = self.endpoint(USER_SEARCH_PATH)?;
        let body = SearchRequest::deactivated_users(limit, after);

        let response: ApiResponse<SearchResponse> =
            self.fetch(ctx, self.request(Method::POST, url).json(&body)).await?;
        let next_cursor = response.data.next_cursor();
        Ok(ApiPage::new(response.data.user_ids(), next_cursor, response.rate_limit))
    }
}

/// Parse the base URL, making sure it ends with a slash so relative endpoint
/// paths are appended rather than replacing the last segment.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| ConnectorError::Config(format!("invalid base URL: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
