//! HubSpot records to normalized resources
//!
//! Mappers are deterministic: the same record always yields the same
//! resource.

use hubspot_sync_domain::utils::text::title_case;
use hubspot_sync_domain::{
    Account, AccountProfile, Annotation, Annotations, ProfileAdapter, Resource, ResourceId,
    ResourceKind, Role, RoleProfile, Team, TeamProfile, TraitDetails, User, UserEmail,
    UserProfile, UserStatus, UserTrait,
};

/// The account resource, advertising users, teams and roles as children.
pub fn account_resource(account: &Account, parent: Option<&ResourceId>) -> Resource {
    let profile = AccountProfile {
        account_id: account.id,
        account_type: account.account_type.clone(),
    };

    let annotations = [ResourceKind::User, ResourceKind::Team, ResourceKind::Role]
        .into_iter()
        .fold(Annotations::new(), |annotations, kind| {
            annotations.with(Annotation::ChildResourceType {
                resource_type_id: kind.id().to_string(),
            })
        });

    Resource {
        id: ResourceId::new(ResourceKind::Account, account.id.to_string()),
        display_name: account.id.to_string(),
        parent_id: parent.cloned(),
        profile: profile.to_profile(),
        details: TraitDetails::App,
        annotations,
    }
}

pub fn team_resource(team: &Team, parent: Option<&ResourceId>) -> Resource {
    let profile = TeamProfile {
        team_id: team.id.clone(),
        team_name: team.name.clone(),
        primary_user_ids: team.user_ids.clone(),
        secondary_user_ids: team.secondary_user_ids.clone(),
    };

    Resource {
        id: ResourceId::new(ResourceKind::Team, team.id.clone()),
        display_name: team.name.clone(),
        parent_id: parent.cloned(),
        profile: profile.to_profile(),
        details: TraitDetails::Group,
        annotations: Annotations::new(),
    }
}

/// Roles display title-cased.
pub fn role_resource(role: &Role, parent: Option<&ResourceId>) -> Resource {
    let profile = RoleProfile { role_id: role.id.clone(), role_name: role.name.clone() };

    Resource {
        id: ResourceId::new(ResourceKind::Role, role.id.clone()),
        display_name: title_case(&role.name),
        parent_id: parent.cloned(),
        profile: profile.to_profile(),
        details: TraitDetails::Role,
        annotations: Annotations::new(),
    }
}

pub fn user_resource(user: &User, status: UserStatus, parent: Option<&ResourceId>) -> Resource {
    let profile = UserProfile {
        user_id: user.id.clone(),
        login: user.email.clone(),
        role_ids: user.role_ids.clone(),
        primary_team_id: user.primary_team().map(ToString::to_string),
        secondary_team_ids: user.secondary_team_ids.clone(),
        super_admin: user.super_admin,
    };

    let emails = if user.email.is_empty() {
        Vec::new()
    } else {
        vec![UserEmail { address: user.email.clone(), is_primary: true }]
    };

    Resource {
        id: ResourceId::new(ResourceKind::User, user.id.clone()),
        display_name: user.email.clone(),
        parent_id: parent.cloned(),
        profile: profile.to_profile(),
        details: TraitDetails::User(UserTrait {
            emails,
            status,
            login: user.email.clone(),
            last_login: user.last_login_at,
        }),
        annotations: Annotations::new(),
    }
}

#[cfg(test)]
mod tests {
    use hubspot_sync_domain::ProfileValue;

    use super::*;

    #[test]
    fn account_advertises_child_types() {
        let account = Account { id: 123, account_type: "STANDARD".into() };
        let resource = account_resource(&account, None);

        assert_eq!(resource.id.to_string(), "account:123");
        assert_eq!(resource.display_name, "123");
        assert_eq!(
            resource.annotations.child_resource_types().collect::<Vec<_>>(),
            vec!["user", "team", "role"]
        );
        assert_eq!(AccountProfile::from_profile(&resource.profile).unwrap().account_id, 123);
    }

    #[test]
    fn team_profile_lists_both_memberships() {
        let team = Team {
            id: "t1".into(),
            name: "Sales".into(),
            user_ids: vec!["u1".into(), "u2".into()],
            secondary_user_ids: vec!["u3".into()],
        };
        let parent = ResourceId::new(ResourceKind::Account, "123");
        let resource = team_resource(&team, Some(&parent));

        assert_eq!(resource.parent_id, Some(parent));
        assert_eq!(resource.profile.get("team_users"), Some(&ProfileValue::from("u1,u2")));
        assert_eq!(resource.profile.get("team_secondary_users"), Some(&ProfileValue::from("u3")));
    }

    #[test]
    fn role_display_name_is_title_cased() {
        let resource = role_resource(&Role::new("r1", "sales manager"), None);
        assert_eq!(resource.display_name, "Sales Manager");
        assert_eq!(resource.profile.get("role_name"), Some(&ProfileValue::from("sales manager")));

        let hyphenated = role_resource(&Role::new("r2", "read-only"), None);
        assert_eq!(hyphenated.display_name, "Read-Only");
    }

    #[test]
    fn user_mapping_is_deterministic() {
        let user = User {
            id: "u1".into(),
            email: "ada@example.com".into(),
            role_ids: vec!["r1".into()],
            super_admin: true,
            ..Default::default()
        };

        let first = user_resource(&user, UserStatus::Disabled, None);
        assert_eq!(first, user_resource(&user, UserStatus::Disabled, None));

        let details = first.user_trait().unwrap();
        assert_eq!(details.status, UserStatus::Disabled);
        assert_eq!(details.login, "ada@example.com");
        assert_eq!(details.emails.len(), 1);
        assert_eq!(first.profile.get("super_admin"), Some(&ProfileValue::Bool(true)));
    }
}
