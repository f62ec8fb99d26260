//! Manual grant and revoke
//!
//! The target entitlement is looked up the way an orchestrator would see it:
//! list the account, list the resource type under it, then read the
//! resource's entitlements. The principal is read with a single `get_user`.

use hubspot_sync_core::sync::mappers::user_resource;
use hubspot_sync_core::{CallContext, HubSpotApi, HubSpotConnector, ResourceSyncer};
use hubspot_sync_domain::{
    Annotations, ConnectorError, Entitlement, Grant, Resource, ResourceId, ResourceKind, Result,
    ResultExt, UserStatus,
};
use serde::Serialize;
use tracing::info;

/// Which membership to change, and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionTarget {
    pub user_id: String,
    pub kind: ResourceKind,
    pub resource_id: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    pub action: &'static str,
    pub grant_id: String,
    pub annotations: Annotations,
}

/// Grant the target entitlement to the user.
///
/// # Errors
/// `NotFound` if the resource or user does not exist, otherwise whatever the
/// connector's grant returns.
pub async fn grant(
    connector: &HubSpotConnector,
    api: &dyn HubSpotApi,
    ctx: &CallContext,
    target: &ProvisionTarget,
) -> Result<ProvisionOutcome> {
    let (principal, entitlement) = resolve(connector, api, ctx, target).await?;

    let annotations = connector.grant(ctx, &principal, &entitlement).await?;
    let grant = Grant::new(&entitlement, principal.id);
    info!(grant = %grant.id, "membership granted");

    Ok(ProvisionOutcome { action: "grant", grant_id: grant.id, annotations })
}

/// Revoke the target entitlement from the user.
///
/// # Errors
/// Same as [`grant`].
pub async fn revoke(
    connector: &HubSpotConnector,
    api: &dyn HubSpotApi,
    ctx: &CallContext,
    target: &ProvisionTarget,
) -> Result<ProvisionOutcome> {
    let (principal, entitlement) = resolve(connector, api, ctx, target).await?;

    let grant = Grant::new(&entitlement, principal.id);
    let annotations = connector.revoke(ctx, &grant).await?;
    info!(grant = %grant.id, "membership revoked");

    Ok(ProvisionOutcome { action: "revoke", grant_id: grant.id, annotations })
}

async fn resolve(
    connector: &HubSpotConnector,
    api: &dyn HubSpotApi,
    ctx: &CallContext,
    target: &ProvisionTarget,
) -> Result<(Resource, Entitlement)> {
    let account = connector
        .syncer(ResourceKind::Account)
        .list(ctx, None, "")
        .await?
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ConnectorError::NotFound("account".into()))?;

    let resource = find_resource(connector.syncer(target.kind), ctx, &account.id, target).await?;

    let entitlement = connector
        .syncer(target.kind)
        .entitlements(ctx, &resource, "")
        .await?
        .items
        .into_iter()
        .find(|entitlement| entitlement.slug == target.slug)
        .ok_or_else(|| ConnectorError::UnsupportedEntitlement {
            resource_type: target.kind.to_string(),
            slug: target.slug.clone(),
        })?;

    let user = api.get_user(ctx, &target.user_id).await.with_context(|| {
        format!("hubspot-connector: failed to get user {}", target.user_id)
    })?;
    let principal = user_resource(&user.data, UserStatus::Unspecified, Some(&account.id));

    Ok((principal, entitlement))
}

async fn find_resource(
    syncer: &dyn ResourceSyncer,
    ctx: &CallContext,
    parent: &ResourceId,
    target: &ProvisionTarget,
) -> Result<Resource> {
    let mut token = String::new();
    loop {
        let page = syncer.list(ctx, Some(parent), &token).await?;
        if let Some(found) = page.items.into_iter().find(|r| r.id.resource == target.resource_id) {
            return Ok(found);
        }
        if page.next_token.is_empty() || page.next_token == token {
            return Err(ConnectorError::NotFound(format!(
                "{} {}",
                target.kind, target.resource_id
            )));
        }
        token = page.next_token;
    }
}
