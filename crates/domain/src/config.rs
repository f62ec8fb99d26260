//! Connector configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_PAGE_SIZE,
};
use crate::errors::{ConnectorError, Result};

/// Settings the connector is constructed with.
///
/// Page size is carried here and handed to every syncer at construction;
/// nothing reads a process-wide default.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// HubSpot private app / personal access token.
    pub access_token: String,

    /// Sync user status through the deactivated-user search. Needs the
    /// `crm.objects.users.read` scope.
    #[serde(default)]
    pub user_status: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ConnectorConfig {
    /// Configuration with defaults for everything but the token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user_status: false,
            base_url: default_base_url(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn with_user_status(mut self, enabled: bool) -> Self {
        self.user_status = enabled;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the configuration before any client is built.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` if the token is empty, the page size
    /// is outside `1..=100`, the timeout is zero or the base URL is not an
    /// http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(ConnectorError::Config("access token is missing".into()));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConnectorError::Config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConnectorError::Config("request timeout must be positive".into()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| ConnectorError::Config(format!("invalid base URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectorError::Config(format!(
                "base URL must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("access_token", &"<redacted>")
            .field("user_status", &self.user_status)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
