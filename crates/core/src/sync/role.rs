//! Role syncer - role assignment

use std::sync::Arc;

use async_trait::async_trait;
use hubspot_sync_domain::constants::MEMBER_ENTITLEMENT;
use hubspot_sync_domain::{
    Annotations, ConnectorError, Entitlement, Grant, Page, ProfileAdapter, Resource, ResourceId,
    ResourceKind, Result, ResultExt, RoleProfile,
};
use tracing::{debug, instrument};

use super::mappers::role_resource;
use super::{available_roles, ResourceProvisioner, ResourceSyncer};
use crate::context::CallContext;
use crate::pagination::Bag;
use crate::ports::HubSpotApi;
use crate::provisioning::{ensure_user_principal, plan_role_grant, plan_role_revoke};

/// Syncs roles and provisions role assignment.
///
/// Portals without role support list no roles, and their role entitlements
/// and grants are empty rather than failing the sync.
pub struct RoleSyncer {
    api: Arc<dyn HubSpotApi>,
    page_size: u32,
}

impl RoleSyncer {
    pub fn new(api: Arc<dyn HubSpotApi>, page_size: u32) -> Self {
        Self { api, page_size }
    }

    fn member_entitlement(resource: &Resource) -> Entitlement {
        Entitlement::assignment(resource, MEMBER_ENTITLEMENT)
            .grantable_to(ResourceKind::User)
            .with_display_name(format!("{} Role Member", resource.display_name))
            .with_description(format!("Assigned the {} role in HubSpot", resource.display_name))
    }

    fn ensure_member_slug(entitlement: &Entitlement) -> Result<()> {
        if entitlement.slug == MEMBER_ENTITLEMENT {
            Ok(())
        } else {
            Err(ConnectorError::UnsupportedEntitlement {
                resource_type: ResourceKind::Role.id().to_string(),
                slug: entitlement.slug.clone(),
            })
        }
    }

    async fn apply(
        &self,
        ctx: &CallContext,
        principal: &ResourceId,
        entitlement: &Entitlement,
        grant: bool,
    ) -> Result<Annotations> {
        ensure_user_principal(principal)?;
        Self::ensure_member_slug(entitlement)?;
        let role_id = &entitlement.resource.id.resource;

        let current = self
            .api
            .get_user(ctx, &principal.resource)
            .await
            .context("hubspot-connector: failed to get user")?;

        let update = if grant {
            plan_role_grant(role_id)
        } else {
            plan_role_revoke(&current.data, role_id)?
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
impl ResourceSyncer for RoleSyncer {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Role
    }

    /// Roles are listed under the account only.
    #[instrument(skip(self, ctx))]
    async fn list(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        _token: &str,
    ) -> Result<Page<Resource>> {
        let Some(parent) = parent else {
            return Ok(Page::empty());
        };

        let (roles, annotations) = available_roles(self.api.as_ref(), ctx).await?;
        let resources = roles.iter().map(|role| role_resource(role, Some(parent))).collect();
        Ok(Page::last(resources).with_annotations(annotations))
    }

    #[instrument(skip(self, ctx, resource), fields(resource = %resource.id))]
    async fn entitlements(
        &self,
        ctx: &CallContext,
        resource: &Resource,
        _token: &str,
    ) -> Result<Page<Entitlement>> {
        let (roles, annotations) = available_roles(self.api.as_ref(), ctx).await?;
        if roles.is_empty() {
            return Ok(Page::empty().with_annotations(annotations));
        }

        Ok(Page::last(vec![Self::member_entitlement(resource)]).with_annotations(annotations))
    }

    #[instrument(skip(self, ctx, resource), fields(resource = %resource.id))]
    async fn grants(
        &self,
        ctx: &CallContext,
        resource: &Resource,
        token: &str,
    ) -> Result<Page<Grant>> {
        let (roles, mut annotations) = available_roles(self.api.as_ref(), ctx).await?;
        if roles.is_empty() {
            return Ok(Page::empty().with_annotations(annotations));
        }

        let profile = RoleProfile::from_profile(&resource.profile)
            .context("hubspot-connector: failed to read role profile")?;

        let mut bag = Bag::parse(token, &ResourceId::new(ResourceKind::User, ""))?;
        let page = self
            .api
            .get_users(ctx, self.page_size, bag.page_token())
            .await
            .context("hubspot-connector: failed to list users")?;
        annotations.set_rate_limit(page.rate_limit);

        let member = Self::member_entitlement(resource);
        let grants: Vec<Grant> = page
            .items
            .iter()
            .filter(|user| user.has_role(&profile.role_id))
            .map(|user| Grant::new(&member, ResourceId::new(ResourceKind::User, user.id.clone())))
            .collect();
        debug!(role_id = %profile.role_id, holders = grants.len(), "matched role holders");

        let next_token = bag.advance(&page.next_cursor)?;
        Ok(Page::new(grants, next_token).with_annotations(annotations))
    }

    fn provisioner(&self) -> Option<&dyn ResourceProvisioner> {
        Some(self)
    }
}

#[async_trait]
impl ResourceProvisioner for RoleSyncer {
    #[instrument(skip_all, fields(principal = %principal.id, entitlement = %entitlement.id))]
    async fn grant(
        &self,
        ctx: &CallContext,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<Annotations> {
        self.apply(ctx, &principal.id, entitlement, true)
            .await
            .context("hubspot-connector: failed to grant role")
    }

    #[instrument(skip_all, fields(grant = %grant.id))]
    async fn revoke(&self, ctx: &CallContext, grant: &Grant) -> Result<Annotations> {
        self.apply(ctx, &grant.principal, &grant.entitlement, false)
            .await
            .context("hubspot-connector: failed to revoke role")
    }
}
