//! Typed resource profiles
//!
//! The normalized resource only carries a flat map of scalars, so every
//! profile is a typed struct with an adapter into that map. Id lists are
//! stored comma-joined; the adapter splits them back on the way out.
//!
//! | Profile | Keys |
//! |---------|------|
//! | [`AccountProfile`] | `account_id`, `account_type` |
//! | [`TeamProfile`] | `team_id`, `team_name`, `team_users`, `team_secondary_users` |
//! | [`RoleProfile`] | `role_id`, `role_name` |
//! | [`UserProfile`] | `user_id`, `login`, `user_role_ids`, `user_primary_team_id`, `user_secondary_team_ids`, `super_admin` |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ConnectorError, Result};
use crate::utils::text::{join_ids, split_ids};

/// A single profile scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl From<&str> for ProfileValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ProfileValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ProfileValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ProfileValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

pub type ProfileMap = BTreeMap<String, ProfileValue>;

/// Conversion between a typed profile and the flat scalar map.
pub trait ProfileAdapter: Sized {
    fn to_profile(&self) -> ProfileMap;

    /// # Errors
    /// Returns `ConnectorError::InvalidInput` when a required key is missing
    /// or holds the wrong scalar type.
    fn from_profile(profile: &ProfileMap) -> Result<Self>;
}

fn missing(key: &str) -> ConnectorError {
    ConnectorError::InvalidInput(format!("profile is missing '{key}'"))
}

fn string_value(profile: &ProfileMap, key: &str) -> Result<String> {
    match profile.get(key) {
        Some(ProfileValue::String(value)) => Ok(value.clone()),
        Some(_) => {
            Err(ConnectorError::InvalidInput(format!("profile key '{key}' is not a string")))
        }
        None => Err(missing(key)),
    }
}

fn optional_string(profile: &ProfileMap, key: &str) -> Option<String> {
    match profile.get(key) {
        Some(ProfileValue::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

fn id_list(profile: &ProfileMap, key: &str) -> Result<Vec<String>> {
    string_value(profile, key).map(|joined| split_ids(&joined))
}

fn entry(key: &str, value: impl Into<ProfileValue>) -> (String, ProfileValue) {
    (key.to_string(), value.into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub account_id: i64,
    pub account_type: String,
}

impl ProfileAdapter for AccountProfile {
    fn to_profile(&self) -> ProfileMap {
        ProfileMap::from([
            entry("account_id", self.account_id),
            entry("account_type", self.account_type.as_str()),
        ])
    }

    fn from_profile(profile: &ProfileMap) -> Result<Self> {
        let account_id = match profile.get("account_id") {
            Some(ProfileValue::Int(id)) => *id,
            Some(_) => {
                return Err(ConnectorError::InvalidInput(
                    "profile key 'account_id' is not an integer".into(),
                ))
            }
            None => return Err(missing("account_id")),
        };

        Ok(Self {
            account_id,
            account_type: optional_string(profile, "account_type").unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamProfile {
    pub team_id: String,
    pub team_name: String,
    pub primary_user_ids: Vec<String>,
    pub secondary_user_ids: Vec<String>,
}

impl ProfileAdapter for TeamProfile {
    fn to_profile(&self) -> ProfileMap {
        ProfileMap::from([
            entry("team_id", self.team_id.as_str()),
            entry("team_name", self.team_name.as_str()),
            entry("team_users", join_ids(&self.primary_user_ids)),
            entry("team_secondary_users", join_ids(&self.secondary_user_ids)),
        ])
    }

    fn from_profile(profile: &ProfileMap) -> Result<Self> {
        Ok(Self {
            team_id: string_value(profile, "team_id")?,
            team_name: optional_string(profile, "team_name").unwrap_or_default(),
            primary_user_ids: id_list(profile, "team_users")?,
            secondary_user_ids: id_list(profile, "team_secondary_users")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    pub role_id: String,
    pub role_name: String,
}

impl ProfileAdapter for RoleProfile {
    fn to_profile(&self) -> ProfileMap {
        ProfileMap::from([
            entry("role_id", self.role_id.as_str()),
            entry("role_name", self.role_name.as_str()),
        ])
    }

    fn from_profile(profile: &ProfileMap) -> Result<Self> {
        Ok(Self {
            role_id: string_value(profile, "role_id")?,
            role_name: optional_string(profile, "role_name").unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub login: String,
    pub role_ids: Vec<String>,
    pub primary_team_id: Option<String>,
    pub secondary_team_ids: Vec<String>,
    pub super_admin: bool,
}

impl ProfileAdapter for UserProfile {
    fn to_profile(&self) -> ProfileMap {
        ProfileMap::from([
            entry("user_id", self.user_id.as_str()),
            entry("login", self.login.as_str()),
            entry("user_role_ids", join_ids(&self.role_ids)),
            entry("user_primary_team_id", self.primary_team_id.clone().unwrap_or_default()),
            entry("user_secondary_team_ids", join_ids(&self.secondary_team_ids)),
            entry("super_admin", self.super_admin),
        ])
    }

    fn from_profile(profile: &ProfileMap) -> Result<Self> {
        Ok(Self {
            user_id: string_value(profile, "user_id")?,
            login: optional_string(profile, "login").unwrap_or_default(),
            role_ids: id_list(profile, "user_role_ids")?,
            primary_team_id: optional_string(profile, "user_primary_team_id"),
            secondary_team_ids: id_list(profile, "user_secondary_team_ids")?,
            super_admin: matches!(profile.get("super_admin"), Some(ProfileValue::Bool(true))),
        })
    }
}
