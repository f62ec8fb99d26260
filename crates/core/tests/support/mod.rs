//! Shared test helpers for `hubspot-sync-core` integration tests.
//!
//! These helpers provide an in-memory HubSpot and record builders so that
//! the sync tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod hubspot;

use hubspot_sync_core::{CallContext, ResourceSyncer};
use hubspot_sync_domain::{Grant, Page, Resource, ResourceId, Role, Team, User};

pub use hubspot::MockHubSpotApi;

pub fn user(id: &str) -> User {
    User { id: id.to_string(), email: format!("{id}@example.com"), ..Default::default() }
}

pub fn user_with(id: &str, role: Option<&str>, primary: Option<&str>, secondary: &[&str]) -> User {
    User {
        role_ids: role.map(|r| vec![r.to_string()]).unwrap_or_default(),
        primary_team_id: primary.map(ToString::to_string),
        secondary_team_ids: secondary.iter().map(ToString::to_string).collect(),
        ..user(id)
    }
}

pub fn team(id: &str, name: &str, primary: &[&str], secondary: &[&str]) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        user_ids: primary.iter().map(ToString::to_string).collect(),
        secondary_user_ids: secondary.iter().map(ToString::to_string).collect(),
    }
}

pub fn role(id: &str, name: &str) -> Role {
    Role::new(id, name)
}

/// Follow list tokens until the last page. Panics after 100 pages.
pub async fn drain_list(
    syncer: &dyn ResourceSyncer,
    ctx: &CallContext,
    parent: Option<&ResourceId>,
) -> Vec<Page<Resource>> {
    let mut pages = Vec::new();
    let mut token = String::new();
    for _ in 0..100 {
        let page = syncer.list(ctx, parent, &token).await.expect("list page");
        token = page.next_token.clone();
        pages.push(page);
        if token.is_empty() {
            return pages;
        }
    }
    panic!("listing did not terminate");
}

/// Follow grant tokens for `resource` until the last page.
pub async fn drain_grants(
    syncer: &dyn ResourceSyncer,
    ctx: &CallContext,
    resource: &Resource,
) -> Vec<Page<Grant>> {
    let mut pages = Vec::new();
    let mut token = String::new();
    for _ in 0..100 {
        let page = syncer.grants(ctx, resource, &token).await.expect("grants page");
        token = page.next_token.clone();
        pages.push(page);
        if token.is_empty() {
            return pages;
        }
    }
    panic!("grant paging did not terminate");
}
