//! Error types used throughout the connector

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RateLimitInfo;

/// Main error type for the HubSpot connector
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure before a response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a status >= 300. The body is never decoded.
    #[error("Request failed with HTTP status {status}")]
    Http { status: u16, rate_limit: RateLimitInfo },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid page token: {0}")]
    InvalidPageToken(String),

    #[error("Invalid principal: expected resource type '{expected}', got '{actual}'")]
    InvalidPrincipal { expected: String, actual: String },

    #[error("user {user_id} is already a primary member of team {team_id}")]
    AlreadyPrimaryMember { user_id: String, team_id: String },

    #[error("user {user_id} is already a secondary member of team {team_id}")]
    AlreadySecondaryMember { user_id: String, team_id: String },

    #[error("user {user_id} is not a primary member of team {team_id}")]
    NotPrimaryMember { user_id: String, team_id: String },

    #[error("user {user_id} is not a secondary member of team {team_id}")]
    NotSecondaryMember { user_id: String, team_id: String },

    #[error("user {user_id} does not hold role {role_id}")]
    NotRoleMember { user_id: String, role_id: String },

    #[error("Unsupported entitlement '{slug}' on resource type '{resource_type}'")]
    UnsupportedEntitlement { resource_type: String, slug: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Internal error: {0}")]
    Internal(String),

    /// An error annotated with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<ConnectorError>,
    },
}

impl ConnectorError {
    /// Wrap the error with the name of the originating operation.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Self::Operation { operation: operation.into(), source: Box::new(self) }
    }

    /// The innermost error, with every [`ConnectorError::Operation`] layer
    /// removed.
    pub fn root(&self) -> &Self {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status carried by the root error, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound(_) | Self::Http { status: 404, .. })
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self.root(), Self::Cancelled | Self::DeadlineExceeded)
    }

    /// True for the mutation validation failures. Retrying them cannot
    /// change the outcome.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.root(),
            Self::InvalidPrincipal { .. }
                | Self::AlreadyPrimaryMember { .. }
                | Self::AlreadySecondaryMember { .. }
                | Self::NotPrimaryMember { .. }
                | Self::NotSecondaryMember { .. }
                | Self::NotRoleMember { .. }
                | Self::UnsupportedEntitlement { .. }
        )
    }
}

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Attach operation context to a fallible result.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with a static operation name.
    fn context(self, operation: &str) -> Result<T>;

    /// Wrap the error, if any, with a lazily built operation name.
    fn with_context<F>(self, operation: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, operation: &str) -> Result<T> {
        self.map_err(|err| err.context(operation))
    }

    fn with_context<F>(self, operation: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| err.context(operation()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chain_peels_to_root() {
        let err = ConnectorError::Http { status: 404, rate_limit: RateLimitInfo::default() }
            .context("hubspot-connector: failed to get user")
            .context("hubspot-connector: failed to grant membership");

        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(matches!(err.root(), ConnectorError::Http { status: 404, .. }));
        assert_eq!(
            err.to_string(),
            "hubspot-connector: failed to grant membership: hubspot-connector: failed to get \
             user: Request failed with HTTP status 404"
        );
    }

    #[test]
    fn validation_errors_are_classified() {
        let err = ConnectorError::AlreadyPrimaryMember {
            user_id: "u1".into(),
            team_id: "t1".into(),
        };
        assert!(err.is_validation());
        assert!(!ConnectorError::Network("reset".into()).is_validation());
        assert!(ConnectorError::Cancelled.context("op").is_cancellation());
    }

    #[test]
    fn result_ext_wraps_only_errors() {
        let ok: Result<u8> = Ok(1);
        assert_eq!(ok.context("unused").ok(), Some(1));

        let failed: Result<u8> = Err(ConnectorError::Decode("bad json".into()));
        let wrapped = failed.with_context(|| format!("listing page {}", 3)).unwrap_err();
        assert_eq!(wrapped.to_string(), "listing page 3: Decode error: bad json");
    }
}
