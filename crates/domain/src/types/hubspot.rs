//! HubSpot records
//!
//! Shapes returned by the settings and account-info APIs. Records are built
//! fresh from each response and never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The HubSpot portal the connector is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "portalId")]
    pub id: i64,
    #[serde(rename = "accountType", default)]
    pub account_type: String,
}

/// A HubSpot user as returned by `settings/v3/users`.
///
/// Deactivation is not part of the record; it is derived during the user
/// status scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_ids: Vec<String>,
    #[serde(default)]
    pub primary_team_id: Option<String>,
    #[serde(default)]
    pub secondary_team_ids: Vec<String>,
    #[serde(default)]
    pub super_admin: bool,
    #[serde(default, alias = "lastLogin")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Role used when composing an update payload. Only the first role is
    /// carried; users with several roles keep the first.
    pub fn payload_role_id(&self) -> Option<&str> {
        self.role_ids.iter().map(String::as_str).find(|id| !id.is_empty())
    }

    pub fn primary_team(&self) -> Option<&str> {
        self.primary_team_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_primary_member_of(&self, team_id: &str) -> bool {
        self.primary_team() == Some(team_id)
    }

    pub fn is_secondary_member_of(&self, team_id: &str) -> bool {
        self.secondary_team_ids.iter().any(|id| id == team_id)
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|id| id == role_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Primary members.
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub secondary_user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Partial update for `PUT settings/v3/users/{id}`.
///
/// Only non-empty fields are serialized; an omitted field is not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_team_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secondary_team_ids: Vec<String>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role, ignoring blank ids.
    pub fn role(mut self, role_id: Option<&str>) -> Self {
        self.role_id = role_id.filter(|id| !id.is_empty()).map(ToString::to_string);
        self
    }

    /// Set the primary team, ignoring blank ids.
    pub fn primary_team(mut self, team_id: Option<&str>) -> Self {
        self.primary_team_id = team_id.filter(|id| !id.is_empty()).map(ToString::to_string);
        self
    }

    pub fn secondary_teams(mut self, team_ids: Vec<String>) -> Self {
        self.secondary_team_ids = team_ids;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.role_id.is_none()
            && self.primary_team_id.is_none()
            && self.secondary_team_ids.is_empty()
    }
}
