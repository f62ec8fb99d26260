//! Connector facade driven by the sync orchestrator

use std::sync::Arc;

use hubspot_sync_domain::constants::{CONNECTOR_DESCRIPTION, CONNECTOR_DISPLAY_NAME};
use hubspot_sync_domain::{
    Annotations, ConnectorConfig, ConnectorError, Entitlement, Grant, Resource, ResourceKind,
    ResourceType, Result, ResultExt,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::context::CallContext;
use crate::ports::HubSpotApi;
use crate::sync::{
    AccountSyncer, ResourceProvisioner, ResourceSyncer, RoleSyncer, TeamSyncer, UserSyncer,
};
use crate::user_status::DeletedUserRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
    pub resource_types: Vec<ResourceType>,
}

/// Entry point of the connector: metadata, credential validation, the
/// syncer for each resource kind, and grant / revoke dispatch.
pub struct HubSpotConnector {
    api: Arc<dyn HubSpotApi>,
    registry: Arc<DeletedUserRegistry>,
    account: AccountSyncer,
    team: TeamSyncer,
    role: RoleSyncer,
    user: UserSyncer,
}

impl HubSpotConnector {
    /// Connector with a registry of its own.
    pub fn new(api: Arc<dyn HubSpotApi>, config: &ConnectorConfig) -> Self {
        Self::with_registry(api, config, Arc::new(DeletedUserRegistry::new()))
    }

    /// Connector sharing a caller-owned deleted-user registry.
    pub fn with_registry(
        api: Arc<dyn HubSpotApi>,
        config: &ConnectorConfig,
        registry: Arc<DeletedUserRegistry>,
    ) -> Self {
        let page_size = config.page_size;
        Self {
            account: AccountSyncer::new(Arc::clone(&api), page_size),
            team: TeamSyncer::new(Arc::clone(&api), page_size),
            role: RoleSyncer::new(Arc::clone(&api), page_size),
            user: UserSyncer::new(
                Arc::clone(&api),
                Arc::clone(&registry),
                page_size,
                config.user_status,
            ),
            registry,
            api,
        }
    }

    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: CONNECTOR_DISPLAY_NAME.to_string(),
            description: CONNECTOR_DESCRIPTION.to_string(),
            resource_types: self.resource_types(),
        }
    }

    /// Prove the token works by fetching the account.
    ///
    /// # Errors
    /// Whatever `GetAccount` fails with, wrapped with context.
    #[instrument(skip_all)]
    pub async fn validate(&self, ctx: &CallContext) -> Result<Annotations> {
        let response = self
            .api
            .get_account(ctx)
            .await
            .context("hubspot-connector: failed to validate credentials")?;
        info!(portal_id = response.data.id, "credentials validated");
        Ok(Annotations::new().with_rate_limit(response.rate_limit))
    }

    pub fn resource_types(&self) -> Vec<ResourceType> {
        self.syncers().map(|syncer| syncer.resource_type()).collect()
    }

    pub fn syncer(&self, kind: ResourceKind) -> &dyn ResourceSyncer {
        match kind {
            ResourceKind::Account => &self.account,
            ResourceKind::Team => &self.team,
            ResourceKind::Role => &self.role,
            ResourceKind::User => &self.user,
        }
    }

    /// Syncers in the order a full sync visits them.
    pub fn syncers(&self) -> impl Iterator<Item = &dyn ResourceSyncer> {
        ResourceKind::ALL.into_iter().map(|kind| self.syncer(kind))
    }

    pub fn registry(&self) -> &Arc<DeletedUserRegistry> {
        &self.registry
    }

    fn provisioner_for(&self, entitlement: &Entitlement) -> Result<&dyn ResourceProvisioner> {
        let unsupported = || ConnectorError::UnsupportedEntitlement {
            resource_type: entitlement.resource.id.resource_type.clone(),
            slug: entitlement.slug.clone(),
        };

        let kind = entitlement.resource.kind().ok_or_else(unsupported)?;
        self.syncer(kind).provisioner().ok_or_else(unsupported)
    }

    /// # Errors
    /// `UnsupportedEntitlement` for entitlements that cannot be provisioned,
    /// the mutation validation errors, or the remote failure.
    pub async fn grant(
        &self,
        ctx: &CallContext,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<Annotations> {
        self.provisioner_for(entitlement)?.grant(ctx, principal, entitlement).await
    }

    /// # Errors
    /// As for [`HubSpotConnector::grant`].
    pub async fn revoke(&self, ctx: &CallContext, grant: &Grant) -> Result<Annotations> {
        self.provisioner_for(&grant.entitlement)?.revoke(ctx, grant).await
    }
}
