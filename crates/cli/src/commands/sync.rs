//! Full sync: list every resource type, then entitlements and grants of each
//! resource, following page tokens until they run out.

use std::collections::BTreeMap;
use std::future::Future;

use hubspot_sync_core::{CallContext, HubSpotConnector, ResourceSyncer};
use hubspot_sync_domain::{
    Annotations, ConnectorError, Page, RateLimitInfo, Resource, ResourceId, ResourceKind, Result,
};
use serde::Serialize;
use tracing::{info, instrument};

/// Counts for one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub resources: usize,
    pub entitlements: usize,
    pub grants: usize,
    pub pages: usize,
}

/// What a full sync saw, printed as JSON by the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub resource_types: BTreeMap<String, TypeSummary>,
    pub warnings: Vec<String>,
    /// Rate-limit state reported by the last page that carried one.
    pub rate_limit: Option<RateLimitInfo>,
}

impl SyncSummary {
    pub fn total_resources(&self) -> usize {
        self.resource_types.values().map(|t| t.resources).sum()
    }

    pub fn total_grants(&self) -> usize {
        self.resource_types.values().map(|t| t.grants).sum()
    }

    fn observe(&mut self, annotations: &Annotations) {
        self.warnings.extend(annotations.warnings().map(ToString::to_string));
        if let Some(rate_limit) = annotations.rate_limit() {
            self.rate_limit = Some(rate_limit.clone());
        }
    }
}

/// Enumerate everything the connector exposes.
///
/// The account is listed first; every other type is listed under it.
///
/// # Errors
/// The first error of any page, or `Internal` if a page token repeats.
#[instrument(skip_all)]
pub async fn run_full_sync(connector: &HubSpotConnector, ctx: &CallContext) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();

    let accounts =
        collect_resources(connector.syncer(ResourceKind::Account), ctx, None, &mut summary).await?;
    let account_id = accounts
        .first()
        .map(|account| account.id.clone())
        .ok_or_else(|| ConnectorError::NotFound("account".into()))?;

    for syncer in connector.syncers() {
        let kind = syncer.kind();
        let resources = if kind == ResourceKind::Account {
            accounts.clone()
        } else {
            collect_resources(syncer, ctx, Some(&account_id), &mut summary).await?
        };

        let skip = syncer.resource_type().annotations.skips_entitlements_and_grants();
        let mut counts = TypeSummary { resources: resources.len(), ..TypeSummary::default() };

        if !skip {
            for resource in &resources {
                let (entitlements, pages) = drain(&mut summary, |token: String| async move {
                    syncer.entitlements(ctx, resource, &token).await
                })
                .await?;
                counts.entitlements += entitlements.len();
                counts.pages += pages;

                let (grants, pages) = drain(&mut summary, |token: String| async move {
                    syncer.grants(ctx, resource, &token).await
                })
                .await?;
                counts.grants += grants.len();
                counts.pages += pages;
            }
        }

        info!(resource_type = %kind, ?counts, "resource type synced");
        summary.resource_types.insert(kind.to_string(), counts);
    }

    Ok(summary)
}

async fn collect_resources(
    syncer: &dyn ResourceSyncer,
    ctx: &CallContext,
    parent: Option<&ResourceId>,
    summary: &mut SyncSummary,
) -> Result<Vec<Resource>> {
    let (resources, _) = drain(summary, |token: String| async move {
        syncer.list(ctx, parent, &token).await
    })
    .await?;
    Ok(resources)
}

/// Follow page tokens until an empty one, returning the items and the
/// number of pages fetched.
async fn drain<T, F, Fut>(summary: &mut SyncSummary, mut fetch: F) -> Result<(Vec<T>, usize)>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token = String::new();
    let mut pages = 0;

    loop {
        let page = fetch(token.clone()).await?;
        pages += 1;
        summary.observe(&page.annotations);
        items.extend(page.items);

        if page.next_token.is_empty() {
            return Ok((items, pages));
        }
        if page.next_token == token {
            return Err(ConnectorError::Internal("page token did not advance".into()));
        }
        token = page.next_token;
    }
}
