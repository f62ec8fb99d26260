//! Grant / revoke planning
//!
//! A HubSpot user holds a role, a primary team and a list of secondary
//! teams in one record, and the update endpoint takes them all at once.
//! Each plan below reads the current user and composes a payload that
//! changes exactly one relationship while carrying the others forward.
//!
//! | Operation | Precondition | Payload |
//! |-----------|--------------|---------|
//! | grant primary | not already primary | role, target primary, secondaries |
//! | grant secondary | not already secondary | role, primary, secondaries + target |
//! | grant role | none | target role |
//! | revoke primary | is primary | role, secondaries |
//! | revoke secondary | is secondary | role, primary, secondaries - target |
//! | revoke role | holds role | empty |
//!
//! Planning is pure: a rejected plan never reaches the API.

use hubspot_sync_domain::constants::{PRIMARY_MEMBER_ENTITLEMENT, SECONDARY_MEMBER_ENTITLEMENT};
use hubspot_sync_domain::{
    impl_tag_conversions, ConnectorError, ResourceId, ResourceKind, Result, User, UserUpdate,
};

/// Which team relationship an entitlement stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamMembership {
    Primary,
    Secondary,
}

impl_tag_conversions!(TeamMembership {
    Primary => "primary-member",
    Secondary => "secondary-member",
});

impl TeamMembership {
    pub const ALL: [Self; 2] = [Self::Primary, Self::Secondary];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Primary => PRIMARY_MEMBER_ENTITLEMENT,
            Self::Secondary => SECONDARY_MEMBER_ENTITLEMENT,
        }
    }

    /// # Errors
    /// `UnsupportedEntitlement` for any slug other than the two memberships.
    pub fn from_slug(slug: &str) -> Result<Self> {
        slug.parse().map_err(|_| ConnectorError::UnsupportedEntitlement {
            resource_type: ResourceKind::Team.id().to_string(),
            slug: slug.to_string(),
        })
    }
}

/// Only users can hold team or role membership.
///
/// # Errors
/// `InvalidPrincipal` for any other resource type.
pub fn ensure_user_principal(principal: &ResourceId) -> Result<()> {
    if principal.is_kind(ResourceKind::User) {
        Ok(())
    } else {
        Err(ConnectorError::InvalidPrincipal {
            expected: ResourceKind::User.id().to_string(),
            actual: principal.resource_type.clone(),
        })
    }
}

/// # Errors
/// `AlreadyPrimaryMember` / `AlreadySecondaryMember` when the membership is
/// already held.
pub fn plan_team_grant(
    user: &User,
    team_id: &str,
    membership: TeamMembership,
) -> Result<UserUpdate> {
    match membership {
        TeamMembership::Primary => {
            if user.is_primary_member_of(team_id) {
                return Err(ConnectorError::AlreadyPrimaryMember {
                    user_id: user.id.clone(),
                    team_id: team_id.to_string(),
                });
            }

            Ok(UserUpdate::new()
                .role(user.payload_role_id())
                .primary_team(Some(team_id))
                .secondary_teams(user.secondary_team_ids.clone()))
        }
        TeamMembership::Secondary => {
            if user.is_secondary_member_of(team_id) {
                return Err(ConnectorError::AlreadySecondaryMember {
                    user_id: user.id.clone(),
                    team_id: team_id.to_string(),
                });
            }

            let mut secondary = user.secondary_team_ids.clone();
            secondary.push(team_id.to_string());

            Ok(UserUpdate::new()
                .role(user.payload_role_id())
                .primary_team(user.primary_team())
                .secondary_teams(secondary))
        }
    }
}

/// # Errors
/// `NotPrimaryMember` / `NotSecondaryMember` when the membership is not held.
pub fn plan_team_revoke(
    user: &User,
    team_id: &str,
    membership: TeamMembership,
) -> Result<UserUpdate> {
    match membership {
        TeamMembership::Primary => {
            if !user.is_primary_member_of(team_id) {
                return Err(ConnectorError::NotPrimaryMember {
                    user_id: user.id.clone(),
                    team_id: team_id.to_string(),
                });
            }

            Ok(UserUpdate::new()
                .role(user.payload_role_id())
                .secondary_teams(user.secondary_team_ids.clone()))
        }
        TeamMembership::Secondary => {
            if !user.is_secondary_member_of(team_id) {
                return Err(ConnectorError::NotSecondaryMember {
                    user_id: user.id.clone(),
                    team_id: team_id.to_string(),
                });
            }

            let remaining =
                user.secondary_team_ids.iter().filter(|id| *id != team_id).cloned().collect();

            Ok(UserUpdate::new()
                .role(user.payload_role_id())
                .primary_team(user.primary_team())
                .secondary_teams(remaining))
        }
    }
}

/// Role assignment overwrites whatever role the user had.
pub fn plan_role_grant(role_id: &str) -> UserUpdate {
    UserUpdate::new().role(Some(role_id))
}

/// # Errors
/// `NotRoleMember` when the user does not hold `role_id`.
pub fn plan_role_revoke(user: &User, role_id: &str) -> Result<UserUpdate> {
    if !user.has_role(role_id) {
        return Err(ConnectorError::NotRoleMember {
            user_id: user.id.clone(),
            role_id: role_id.to_string(),
        });
    }
    Ok(UserUpdate::new())
}
