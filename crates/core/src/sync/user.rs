//! User syncer - users and their enabled / disabled status

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use hubspot_sync_domain::{
    Annotation, Annotations, Entitlement, Grant, Page, Resource, ResourceId, ResourceKind,
    ResourceType, Result, ResultExt, UserStatus,
};
use tracing::{debug, info, instrument};

use super::mappers::user_resource;
use super::ResourceSyncer;
use crate::context::CallContext;
use crate::pagination::Bag;
use crate::ports::HubSpotApi;
use crate::user_status::{unknown_lineage, DeletedUserRegistry, SyncPhase, UsersPageToken};

/// Syncs users. Users carry no entitlements of their own.
///
/// With user status enabled, listing runs the two-phase scan described in
/// [`crate::user_status`]; otherwise users are listed in one pass with an
/// unspecified status.
pub struct UserSyncer {
    api: Arc<dyn HubSpotApi>,
    registry: Arc<DeletedUserRegistry>,
    page_size: u32,
    user_status: bool,
}

impl UserSyncer {
    pub fn new(
        api: Arc<dyn HubSpotApi>,
        registry: Arc<DeletedUserRegistry>,
        page_size: u32,
        user_status: bool,
    ) -> Self {
        Self { api, registry, page_size, user_status }
    }

    fn users_frame() -> ResourceId {
        ResourceId::new(ResourceKind::User, "")
    }

    async fn list_all(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        token: &str,
    ) -> Result<Page<Resource>> {
        let mut bag = Bag::parse(token, &Self::users_frame())?;
        let page = self
            .api
            .get_users(ctx, self.page_size, bag.page_token())
            .await
            .context("hubspot-connector: failed to list users")?;

        let resources = page
            .items
            .iter()
            .map(|user| user_resource(user, UserStatus::Unspecified, parent))
            .collect();

        let next_token = bag.advance(&page.next_cursor)?;
        Ok(Page::new(resources, next_token)
            .with_annotations(Annotations::new().with_rate_limit(page.rate_limit)))
    }

    async fn list_with_status(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        token: &str,
    ) -> Result<Page<Resource>> {
        let mut bag = Bag::parse(token, &Self::users_frame())?;

        let (state, started) = match UsersPageToken::decode(bag.page_token())? {
            Some(state) => (state, false),
            None => {
                let state = UsersPageToken::start();
                self.registry.begin(&state.lineage);
                info!(lineage = %state.lineage, "starting deleted-user scan");
                (state, true)
            }
        };

        let result = match state.phase {
            SyncPhase::DeletedScan => self.scan_deleted(ctx, &mut bag, &state).await,
            SyncPhase::AllUsersScan => self.scan_all(ctx, parent, &mut bag, &state).await,
            SyncPhase::Completed => {
                self.registry.complete(&state.lineage);
                bag.advance("").map(|next_token| Page::new(Vec::new(), next_token))
            }
        };

        // A scan that fails on its first page has no token to resume from.
        if started && result.is_err() {
            self.registry.complete(&state.lineage);
        }
        result
    }

    /// Record one page of deactivated ids. Emits no users.
    async fn scan_deleted(
        &self,
        ctx: &CallContext,
        bag: &mut Bag,
        state: &UsersPageToken,
    ) -> Result<Page<Resource>> {
        let page = self
            .api
            .search_deactivated_users(ctx, self.page_size, &state.page)
            .await
            .context("hubspot-connector: failed to search deactivated users")?;

        let recorded = self.registry.record(&state.lineage, page.items)?;
        debug!(lineage = %state.lineage, recorded, "recorded deactivated users");

        let next = if page.next_cursor.is_empty() {
            info!(lineage = %state.lineage, deactivated = recorded, "deleted-user scan complete");
            state.enter(SyncPhase::AllUsersScan)
        } else {
            state.next_page(page.next_cursor)
        };

        let next_token = bag.advance(&next.encode()?)?;
        Ok(Page::new(Vec::new(), next_token)
            .with_annotations(Annotations::new().with_rate_limit(page.rate_limit)))
    }

    /// List one page of users, stamping each with its status.
    async fn scan_all(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        bag: &mut Bag,
        state: &UsersPageToken,
    ) -> Result<Page<Resource>> {
        let deleted: HashSet<String> = self
            .registry
            .snapshot(&state.lineage)
            .ok_or_else(|| unknown_lineage(&state.lineage))?;

        let page = self
            .api
            .get_users(ctx, self.page_size, &state.page)
            .await
            .context("hubspot-connector: failed to list users")?;

        let resources = page
            .items
            .iter()
            .map(|user| {
                let status = if deleted.contains(&user.id) {
                    UserStatus::Disabled
                } else {
                    UserStatus::Enabled
                };
                user_resource(user, status, parent)
            })
            .collect();

        let next_token = if page.next_cursor.is_empty() {
            self.registry.complete(&state.lineage);
            info!(lineage = %state.lineage, "user scan complete");
            bag.advance("")?
        } else {
            bag.advance(&state.next_page(page.next_cursor).encode()?)?
        };

        Ok(Page::new(resources, next_token)
            .with_annotations(Annotations::new().with_rate_limit(page.rate_limit)))
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::new(ResourceKind::User)
            .with_annotations(Annotations::new().with(Annotation::SkipEntitlementsAndGrants))
    }

    #[instrument(skip(self, ctx))]
    async fn list(
        &self,
        ctx: &CallContext,
        parent: Option<&ResourceId>,
        token: &str,
    ) -> Result<Page<Resource>> {
        if self.user_status {
            self.list_with_status(ctx, parent, token).await
        } else {
            self.list_all(ctx, parent, token).await
        }
    }

    async fn entitlements(
        &self,
        _ctx: &CallContext,
        _resource: &Resource,
        _token: &str,
    ) -> Result<Page<Entitlement>> {
        Ok(Page::empty())
    }

    async fn grants(
        &self,
        _ctx: &CallContext,
        _resource: &Resource,
        _token: &str,
    ) -> Result<Page<Grant>> {
        Ok(Page::empty())
    }
}
