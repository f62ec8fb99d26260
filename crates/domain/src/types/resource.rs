//! Normalized resource model
//!
//! Resources, entitlements and grants as the sync orchestrator consumes
//! them, plus the side annotations (rate limits, child types, warnings)
//! returned alongside each page.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::ProfileMap;
use crate::impl_tag_conversions;

// ============================================================================
// Resource types
// ============================================================================

/// The closed set of resource kinds the connector syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Account,
    Team,
    Role,
    User,
}

impl_tag_conversions!(ResourceKind {
    Account => "account",
    Team => "team",
    Role => "role",
    User => "user",
});

impl ResourceKind {
    /// Every kind, in the order a full sync visits them.
    pub const ALL: [Self; 4] = [Self::Account, Self::Team, Self::Role, Self::User];

    pub const fn id(self) -> &'static str {
        self.as_str()
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Team => "Team",
            Self::Role => "Role",
            Self::User => "User",
        }
    }

    pub const fn resource_trait(self) -> ResourceTrait {
        match self {
            Self::Account => ResourceTrait::App,
            Self::Team => ResourceTrait::Group,
            Self::Role => ResourceTrait::Role,
            Self::User => ResourceTrait::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
    App,
    Group,
    Role,
    User,
}

/// Description of a resource type advertised to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: String,
    pub display_name: String,
    pub traits: Vec<ResourceTrait>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ResourceType {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            id: kind.id().to_string(),
            display_name: kind.display_name().to_string(),
            traits: vec![kind.resource_trait()],
            annotations: Annotations::new(),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub resource: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, resource: impl Into<String>) -> Self {
        Self { resource_type: kind.id().to_string(), resource: resource.into() }
    }

    /// The kind this id belongs to, if it is one the connector knows.
    pub fn kind(&self) -> Option<ResourceKind> {
        self.resource_type.parse().ok()
    }

    pub fn is_kind(&self, kind: ResourceKind) -> bool {
        self.resource_type == kind.id()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Enabled,
    Disabled,
    #[default]
    Unspecified,
}

impl_tag_conversions!(UserStatus {
    Enabled => "enabled",
    Disabled => "disabled",
    Unspecified => "unspecified",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub address: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTrait {
    pub emails: Vec<UserEmail>,
    pub status: UserStatus,
    pub login: String,
    pub last_login: Option<DateTime<Utc>>,
}

/// Trait-specific data attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trait", rename_all = "snake_case")]
pub enum TraitDetails {
    App,
    Group,
    Role,
    User(UserTrait),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    pub parent_id: Option<ResourceId>,
    /// Flat scalar attributes; see [`super::profile::ProfileAdapter`].
    pub profile: ProfileMap,
    pub details: TraitDetails,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Resource {
    pub fn kind(&self) -> Option<ResourceKind> {
        self.id.kind()
    }

    pub fn user_trait(&self) -> Option<&UserTrait> {
        match &self.details {
            TraitDetails::User(user) => Some(user),
            _ => None,
        }
    }
}

// ============================================================================
// Entitlements and grants
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    Assignment,
    Permission,
}

/// A grantable capability on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub resource: Resource,
    pub slug: String,
    pub display_name: String,
    pub description: String,
    pub purpose: EntitlementPurpose,
    pub grantable_to: Vec<String>,
}

impl Entitlement {
    fn new(resource: &Resource, slug: &str, purpose: EntitlementPurpose) -> Self {
        Self {
            id: format!("{}:{slug}", resource.id),
            resource: resource.clone(),
            slug: slug.to_string(),
            display_name: slug.to_string(),
            description: String::new(),
            purpose,
            grantable_to: Vec::new(),
        }
    }

    pub fn assignment(resource: &Resource, slug: &str) -> Self {
        Self::new(resource, slug, EntitlementPurpose::Assignment)
    }

    pub fn permission(resource: &Resource, slug: &str) -> Self {
        Self::new(resource, slug, EntitlementPurpose::Permission)
    }

    pub fn grantable_to(mut self, kind: ResourceKind) -> Self {
        self.grantable_to.push(kind.id().to_string());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Evidence that a principal holds an entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: String,
    pub entitlement: Entitlement,
    pub principal: ResourceId,
}

impl Grant {
    pub fn new(entitlement: &Entitlement, principal: ResourceId) -> Self {
        Self {
            id: format!("{}:{principal}", entitlement.id),
            entitlement: entitlement.clone(),
            principal,
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Rate-limit state reported by the API.
///
/// Missing headers leave the fields zero-valued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: i64,
    pub remaining: i64,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    RateLimit(RateLimitInfo),
    ChildResourceType { resource_type_id: String },
    SkipEntitlementsAndGrants,
    /// A tolerated failure, reported instead of failing the page.
    Warning { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    pub fn with(mut self, annotation: Annotation) -> Self {
        self.push(annotation);
        self
    }

    /// Record the latest rate-limit state, replacing any earlier one.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitInfo) -> Self {
        self.set_rate_limit(rate_limit);
        self
    }

    pub fn set_rate_limit(&mut self, rate_limit: RateLimitInfo) {
        self.0.retain(|a| !matches!(a, Annotation::RateLimit(_)));
        self.0.push(Annotation::RateLimit(rate_limit));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.0.push(Annotation::Warning { message: message.into() });
    }

    pub fn extend(&mut self, other: Self) {
        for annotation in other.0 {
            match annotation {
                Annotation::RateLimit(rate_limit) => self.set_rate_limit(rate_limit),
                other => self.0.push(other),
            }
        }
    }

    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.0.iter().find_map(|a| match a {
            Annotation::RateLimit(rate_limit) => Some(rate_limit),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|a| match a {
            Annotation::Warning { message } => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn child_resource_types(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|a| match a {
            Annotation::ChildResourceType { resource_type_id } => Some(resource_type_id.as_str()),
            _ => None,
        })
    }

    pub fn skips_entitlements_and_grants(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Annotation::SkipEntitlementsAndGrants))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }
}

// ============================================================================
// Pages
// ============================================================================

/// One page of a list / entitlements / grants call.
///
/// An empty `next_token` means there are no more pages for this call
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: String,
    pub annotations: Annotations,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self { items, next_token: next_token.into(), annotations: Annotations::new() }
    }

    /// A final page.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, String::new())
    }

    pub fn empty() -> Self {
        Self::last(Vec::new())
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn has_more(&self) -> bool {
        !self.next_token.is_empty()
    }
}
