//! Account syncer - portal membership and role permissions

use std::sync::Arc;

use async_trait::async_trait;
use hubspot_sync_domain::constants::MEMBER_ENTITLEMENT;
use hubspot_sync_domain::utils::text::title_case;
use hubspot_sync_domain::{
    Annotations, Entitlement, Grant, Page, Resource, ResourceId, ResourceKind, Result, ResultExt,
};
use tracing::{debug, instrument};

use super::mappers::account_resource;
use super::{available_roles, ResourceSyncer};
use crate::context::CallContext;
use crate::pagination::Bag;
use crate::ports::HubSpotApi;

/// Syncs the single account the token belongs to.
///
/// Every user is a `member` of the account. When the portal has roles, each
/// role name is also exposed as an account permission.
pub struct AccountSyncer {
    api: Arc<dyn HubSpotApi>,
    page_size: u32,
}

impl AccountSyncer {
    pub fn new(api: Arc<dyn HubSpotApi>, page_size: u32) -> Self {
        Self { api, page_size }
    }

    fn member_entitlement(resource: &Resource) -> Entitlement {
        Entitlement::assignment(resource, MEMBER_ENTITLEMENT)
            .grantable_to(ResourceKind::User)
            .with_display_name(format!("{} Account Member", resource.display_name))
            .with_description(format!("Member of the {} HubSpot account", resource.display_name))
    }

    fn role_entitlement(resource: &Resource, role_name: &str) -> Entitlement {
        Entitlement::permission(resource, role_name)
            .grantable_to(ResourceKind::User)
            .with_display_name(format!("{} Acc {}", resource.display_name, title_case(role_name)))
            .with_description(format!(
                "{} role in the {} HubSpot account",
                title_case(role_name),
                resource.display_name
            ))
    }
}

#[async_trait]
impl ResourceSyncer for AccountSyncer {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Account
    }

    #[instrument(skip(self, ctx))]
    async fn list(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        _token: &str,
    ) -> Result<Page<Resource>> {
        let response =
            self.api.get_account(ctx).await.context("hubspot-connector: failed to get account")?;

        let resource = account_resource(&response.data, parent);
        Ok(Page::last(vec![resource])
            .with_annotations(Annotations::new().with_rate_limit(response.rate_limit)))
    }

    #[instrument(skip(self, ctx, resource), fields(resource = %resource.id))]
    async fn entitlements(
        &self,
        ctx: &CallContext,
        resource: &Resource,
        _token: &str,
    ) -> Result<Page<Entitlement>> {
        let (roles, annotations) = available_roles(self.api.as_ref(), ctx).await?;

        let mut entitlements = vec![Self::member_entitlement(resource)];
        entitlements.extend(roles.iter().map(|role| Self::role_entitlement(resource, &role.name)));

        Ok(Page::last(entitlements).with_annotations(annotations))
    }

    #[instrument(skip(self, ctx, resource), fields(resource = %resource.id))]
    async fn grants(
        &self,
        ctx: &CallContext,
        resource: &Resource,
        token: &str,
    ) -> Result<Page<Grant>> {
        let (roles, mut annotations) = available_roles(self.api.as_ref(), ctx).await?;

        let mut bag = Bag::parse(token, &ResourceId::new(ResourceKind::User, ""))?;
        let page = self
            .api
            .get_users(ctx, self.page_size, bag.page_token())
            .await
            .context("hubspot-connector: failed to list users")?;
        annotations.set_rate_limit(page.rate_limit);

        let member = Self::member_entitlement(resource);
        let mut grants = Vec::with_capacity(page.items.len());
        for user in &page.items {
            let principal = ResourceId::new(ResourceKind::User, user.id.clone());
            grants.push(Grant::new(&member, principal.clone()));

            for role_id in &user.role_ids {
                match roles.iter().find(|role| &role.id == role_id) {
                    Some(role) => {
                        let entitlement = Self::role_entitlement(resource, &role.name);
                        grants.push(Grant::new(&entitlement, principal.clone()));
                    }
                    None => debug!(user_id = %user.id, role_id, "skipping unknown role"),
                }
            }
        }

        let next_token = bag.advance(&page.next_cursor)?;
        Ok(Page::new(grants, next_token).with_annotations(annotations))
    }
}
