//! Resource syncers
//!
//! One syncer per [`ResourceKind`]. Each lists its resources and, for a
//! given resource, its entitlements and the grants of those entitlements.
//! Team and role syncers can also provision membership.

pub mod account;
pub mod mappers;
pub mod role;
pub mod team;
pub mod user;

use async_trait::async_trait;
use hubspot_sync_domain::{
    Annotations, ConnectorError, Entitlement, Grant, Page, Resource, ResourceId, ResourceKind,
    ResourceType, Result, Role,
};
use tracing::warn;

pub use account::AccountSyncer;
pub use role::RoleSyncer;
pub use team::TeamSyncer;
pub use user::UserSyncer;

use crate::context::CallContext;
use crate::ports::HubSpotApi;

/// Read side of a resource kind.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    fn kind(&self) -> ResourceKind;

    fn resource_type(&self) -> ResourceType {
        ResourceType::new(self.kind())
    }

    /// One page of resources. `token` is the opaque token returned by the
    /// previous call, or `""` for the first page.
    async fn list(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        token: &str,
    ) -> Result<Page<Resource>>;

    async fn entitlements(
        &self,
        ctx: &CallContext,
        resource: &Resource,
        token: &str,
    ) -> Result<Page<Entitlement>>;

    async fn grants(&self, ctx: &CallContext, resource: &Resource, token: &str)
        -> Result<Page<Grant>>;

    /// Write side, for kinds whose entitlements can be provisioned.
    fn provisioner(&self) -> Option<&dyn ResourceProvisioner> {
        None
    }
}

/// Grant / revoke of a kind's entitlements.
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    /// Give `principal` the `entitlement`.
    async fn grant(
        &self,
        ctx: &CallContext,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<Annotations>;

    /// Take the grant's entitlement away from its principal.
    async fn revoke(&self, ctx: &CallContext, grant: &Grant) -> Result<Annotations>;
}

/// Roles of the portal, tolerating portals without role support.
///
/// Any failure other than cancellation yields an empty list and a warning
/// annotation, so callers keep going without role data.
pub(crate) async fn available_roles(
    api: &dyn HubSpotApi,
    ctx: &CallContext,
) -> Result<(Vec<Role>, Annotations)> {
    match api.get_roles(ctx).await {
        Ok(response) => {
            Ok((response.data, Annotations::new().with_rate_limit(response.rate_limit)))
        }
        Err(err) if err.is_cancellation() => Err(err),
        Err(err) => {
            warn!(error = %err, "roles unavailable, continuing without role data");

            let mut annotations = Annotations::new();
            if let ConnectorError::Http { rate_limit, .. } = err.root() {
                annotations.set_rate_limit(rate_limit.clone());
            }
            annotations.warn(format!("roles unavailable: {err}"));
            Ok((Vec::new(), annotations))
        }
    }
}
