//! Team syncer - primary and secondary team membership

use std::sync::Arc;

use async_trait::async_trait;
use hubspot_sync_domain::{
    Annotations, Entitlement, Grant, Page, ProfileAdapter, Resource, ResourceId, ResourceKind,
    Result, ResultExt, TeamProfile,
};
use tracing::{instrument, warn};

use super::mappers::team_resource;
use super::{ResourceProvisioner, ResourceSyncer};
use crate::context::CallContext;
use crate::pagination::{parse_offset, Bag};
use crate::ports::HubSpotApi;
use crate::provisioning::{
    ensure_user_principal, plan_team_grant, plan_team_revoke, TeamMembership,
};

/// Syncs teams and provisions team membership.
///
/// Team membership is always split into `primary-member` and
/// `secondary-member`; a user has at most one primary team.
pub struct TeamSyncer {
    api: Arc<dyn HubSpotApi>,
    page_size: u32,
}

impl TeamSyncer {
    pub fn new(api: Arc<dyn HubSpotApi>, page_size: u32) -> Self {
        Self { api, page_size }
    }

    fn membership_entitlement(resource: &Resource, membership: TeamMembership) -> Entitlement {
        let (label, description) = match membership {
            TeamMembership::Primary => ("Primary Member", "Primary member of the"),
            TeamMembership::Secondary => ("Secondary Member", "Secondary member of the"),
        };

        Entitlement::assignment(resource, membership.slug())
            .grantable_to(ResourceKind::User)
            .with_display_name(format!("{} Team {label}", resource.display_name))
            .with_description(format!("{description} {} team in HubSpot", resource.display_name))
    }

    /// Read the user, plan the change and apply it.
    async fn apply(
        &self,
        ctx: &CallContext,
        principal: &ResourceId,
        team_id: &str,
        slug: &str,
        grant: bool,
    ) -> Result<Annotations> {
        ensure_user_principal(principal)?;
        let membership = TeamMembership::from_slug(slug)?;

        let current = self
            .api
            .get_user(ctx, &principal.resource)
            .await
            .context("hubspot-connector: failed to get user")?;

        let update = if grant {
            plan_team_grant(&current.data, team_id, membership)?
        } else {
            plan_team_revoke(&current.data, team_id, membership)?
        };

        let rate_limit = self
            .api
            .update_user(ctx, &principal.resource, &update)
            .await
            .context("hubspot-connector: failed to update user")?;

        Ok(Annotations::new().with_rate_limit(rate_limit))
    }
}

#[async_trait]
impl ResourceSyncer for TeamSyncer {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Team
    }

    #[instrument(skip(self, ctx))]
    async fn list(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        _token: &str,
    ) -> Result<Page<Resource>> {
        let response =
            self.api.get_teams(ctx).await.context("hubspot-connector: failed to list teams")?;

        let resources = response.data.iter().map(|team| team_resource(team, parent)).collect();
        Ok(Page::last(resources)
            .with_annotations(Annotations::new().with_rate_limit(response.rate_limit)))
    }

    async fn entitlements(
        &self,
        _ctx: &CallContext,
        resource: &Resource,
        _token: &str,
    ) -> Result<Page<Entitlement>> {
        let entitlements = TeamMembership::ALL
            .into_iter()
            .map(|membership| Self::membership_entitlement(resource, membership))
            .collect();
        Ok(Page::last(entitlements))
    }

    /// Pages over primary members followed by secondary members, resolving
    /// each id to a user. Members that no longer exist are skipped.
    #[instrument(skip(self, ctx, resource), fields(resource = %resource.id))]
    async fn grants(
        &self,
        ctx: &CallContext,
        resource: &Resource,
        token: &str,
    ) -> Result<Page<Grant>> {
        let profile = TeamProfile::from_profile(&resource.profile)
            .context("hubspot-connector: failed to read team profile")?;

        let primary = profile.primary_user_ids.iter().map(|id| (TeamMembership::Primary, id));
        let secondary =
            profile.secondary_user_ids.iter().map(|id| (TeamMembership::Secondary, id));
        let members: Vec<(TeamMembership, &String)> = primary.chain(secondary).collect();

        let mut bag = Bag::parse(token, &resource.id)?;
        let offset = parse_offset(bag.page_token())?.min(members.len());
        let end = offset.saturating_add(self.page_size as usize).min(members.len());

        let primary_member = Self::membership_entitlement(resource, TeamMembership::Primary);
        let secondary_member = Self::membership_entitlement(resource, TeamMembership::Secondary);

        let mut annotations = Annotations::new();
        let mut grants = Vec::with_capacity(end - offset);
        for &(membership, user_id) in &members[offset..end] {
            let user = match self.api.get_user(ctx, user_id).await {
                Ok(response) => {
                    annotations.set_rate_limit(response.rate_limit);
                    response.data
                }
                Err(err) if err.is_not_found() => {
                    warn!(team_id = %profile.team_id, %user_id, "team member no longer exists");
                    continue;
                }
                Err(err) => return Err(err.context("hubspot-connector: failed to get user")),
            };

            let entitlement = match membership {
                TeamMembership::Primary => &primary_member,
                TeamMembership::Secondary => &secondary_member,
            };
            grants.push(Grant::new(entitlement, ResourceId::new(ResourceKind::User, user.id)));
        }

        let next = if end < members.len() { end.to_string() } else { String::new() };
        let next_token = bag.advance(&next)?;
        Ok(Page::new(grants, next_token).with_annotations(annotations))
    }

    fn provisioner(&self) -> Option<&dyn ResourceProvisioner> {
        Some(self)
    }
}

#[async_trait]
impl ResourceProvisioner for TeamSyncer {
    #[instrument(skip_all, fields(principal = %principal.id, entitlement = %entitlement.id))]
    async fn grant(
        &self,
        ctx: &CallContext,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<Annotations> {
        let team_id = &entitlement.resource.id.resource;
        self.apply(ctx, &principal.id, team_id, &entitlement.slug, true)
            .await
            .context("hubspot-connector: failed to grant team membership")
    }

    #[instrument(skip_all, fields(grant = %grant.id))]
    async fn revoke(&self, ctx: &CallContext, grant: &Grant) -> Result<Annotations> {
        let team_id = &grant.entitlement.resource.id.resource;
        self.apply(ctx, &grant.principal, team_id, &grant.entitlement.slug, false)
            .await
            .context("hubspot-connector: failed to revoke team membership")
    }
}
