//! Two-phase user listing with deactivated-user status

mod support;

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hubspot_sync_core::{
    Bag, CallContext, DeletedUserRegistry, HubSpotConnector, PageState, ResourceSyncer, SyncPhase,
    UsersPageToken,
};
use hubspot_sync_domain::{
    ConnectorConfig, ConnectorError, Page, Resource, ResourceId, ResourceKind, UserStatus,
};
use support::{drain_list, user, MockHubSpotApi};

fn config(page_size: u32) -> ConnectorConfig {
    ConnectorConfig::new("test-token").with_user_status(true).with_page_size(page_size)
}

fn statuses(pages: &[Page<Resource>]) -> Vec<(String, UserStatus)> {
    pages
        .iter()
        .flat_map(|page| page.items.iter())
        .map(|resource| {
            let status = resource.user_trait().map(|t| t.status).unwrap_or_default();
            (resource.id.resource.clone(), status)
        })
        .collect()
}

#[tokio::test]
async fn deleted_scan_completes_before_any_user_is_emitted() {
    let api = MockHubSpotApi::new()
        .with_users(vec![user("u1"), user("u2"), user("u3")])
        .with_deactivated(&["u2", "u9"]);
    let registry = Arc::new(DeletedUserRegistry::new());
    let connector =
        HubSpotConnector::with_registry(Arc::new(api.clone()), &config(1), Arc::clone(&registry));
    let ctx = CallContext::new();

    let pages = drain_list(connector.syncer(ResourceKind::User), &ctx, None).await;

    // Two deleted-scan pages, then three user pages.
    assert_eq!(pages.len(), 5);
    assert!(pages[..2].iter().all(|page| page.items.is_empty()));
    assert!(pages[2..].iter().all(|page| page.items.len() == 1));

    assert_eq!(api.cursors("search_deactivated_users"), vec!["".to_string(), "1".to_string()]);
    assert_eq!(api.cursors("get_users"), vec!["".to_string(), "1".to_string(), "2".to_string()]);

    assert_eq!(
        statuses(&pages),
        vec![
            ("u1".to_string(), UserStatus::Enabled),
            ("u2".to_string(), UserStatus::Disabled),
            ("u3".to_string(), UserStatus::Enabled),
        ]
    );
    assert_eq!(registry.active_lineages(), 0);
}

#[tokio::test]
async fn phase_token_carries_lineage_between_phases() {
    let api = MockHubSpotApi::new().with_users(vec![user("u1")]).with_deactivated(&["u1"]);
    let registry = Arc::new(DeletedUserRegistry::new());
    let connector =
        HubSpotConnector::with_registry(Arc::new(api), &config(10), Arc::clone(&registry));
    let syncer = connector.syncer(ResourceKind::User);
    let ctx = CallContext::new();

    let first = syncer.list(&ctx, None, "").await.unwrap();
    assert!(first.items.is_empty());
    assert_eq!(registry.active_lineages(), 1);

    let bag = Bag::unmarshal(&first.next_token).unwrap();
    let state = UsersPageToken::decode(bag.page_token()).unwrap().unwrap();
    assert_eq!(state.phase, SyncPhase::AllUsersScan);
    assert_eq!(state.page, "");
    assert!(registry.snapshot(&state.lineage).unwrap().contains("u1"));

    let second = syncer.list(&ctx, None, &first.next_token).await.unwrap();
    assert_eq!(second.items[0].user_trait().unwrap().status, UserStatus::Disabled);
    assert_eq!(second.next_token, "");
    assert_eq!(registry.snapshot(&state.lineage), None);
}

#[tokio::test]
async fn concurrent_scans_do_not_share_deleted_sets() {
    let api = MockHubSpotApi::new().with_users(vec![user("u1")]).with_deactivated(&["u1"]);
    let registry = Arc::new(DeletedUserRegistry::new());
    let connector =
        HubSpotConnector::with_registry(Arc::new(api), &config(10), Arc::clone(&registry));
    let syncer = connector.syncer(ResourceKind::User);
    let ctx = CallContext::new();

    let (a, b) = tokio::join!(syncer.list(&ctx, None, ""), syncer.list(&ctx, None, ""));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.next_token, b.next_token);
    assert_eq!(registry.active_lineages(), 2);

    let a_users = syncer.list(&ctx, None, &a.next_token).await.unwrap();
    assert_eq!(a_users.items.len(), 1);
    assert_eq!(registry.active_lineages(), 1);

    let b_users = syncer.list(&ctx, None, &b.next_token).await.unwrap();
    assert_eq!(b_users.items[0].user_trait().unwrap().status, UserStatus::Disabled);
    assert_eq!(registry.active_lineages(), 0);
}

#[tokio::test]
async fn unknown_lineage_is_rejected() {
    let connector = HubSpotConnector::new(Arc::new(MockHubSpotApi::new()), &config(10));

    let phase = UsersPageToken {
        phase: SyncPhase::AllUsersScan,
        page: String::new(),
        lineage: "never-started".into(),
    };
    let mut bag = Bag::default();
    bag.push(PageState {
        token: phase.encode().unwrap(),
        ..PageState::for_resource(&ResourceId::new(ResourceKind::User, ""))
    });
    let token = bag.marshal().unwrap();

    let err = connector
        .syncer(ResourceKind::User)
        .list(&CallContext::new(), None, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::InvalidPageToken(msg) if msg.contains("never-started")));
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let connector = HubSpotConnector::new(Arc::new(MockHubSpotApi::new()), &config(10));
    let syncer = connector.syncer(ResourceKind::User);
    let ctx = CallContext::new();

    let err = syncer.list(&ctx, None, "!!not-a-token!!").await.unwrap_err();
    assert!(matches!(err, ConnectorError::InvalidPageToken(_)));

    let not_json = URL_SAFE_NO_PAD.encode(b"{");
    assert!(matches!(
        syncer.list(&ctx, None, &not_json).await,
        Err(ConnectorError::InvalidPageToken(_))
    ));
}

#[tokio::test]
async fn failed_first_page_does_not_leak_lineage() {
    let api = MockHubSpotApi::new().fail(
        "search_deactivated_users",
        ConnectorError::Http { status: 403, rate_limit: Default::default() },
    );
    let registry = Arc::new(DeletedUserRegistry::new());
    let connector =
        HubSpotConnector::with_registry(Arc::new(api), &config(10), Arc::clone(&registry));

    let err = connector
        .syncer(ResourceKind::User)
        .list(&CallContext::new(), None, "")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(registry.active_lineages(), 0);
}

#[tokio::test]
async fn status_disabled_lists_in_one_phase() {
    let api = MockHubSpotApi::new()
        .with_users(vec![user("u1"), user("u2")])
        .with_deactivated(&["u2"]);
    let connector = HubSpotConnector::new(
        Arc::new(api.clone()),
        &ConnectorConfig::new("test-token").with_page_size(1),
    );

    let pages = drain_list(connector.syncer(ResourceKind::User), &CallContext::new(), None).await;

    assert_eq!(pages.len(), 2);
    assert_eq!(
        statuses(&pages),
        vec![
            ("u1".to_string(), UserStatus::Unspecified),
            ("u2".to_string(), UserStatus::Unspecified),
        ]
    );
    assert_eq!(api.calls("search_deactivated_users"), 0);
}

#[tokio::test]
async fn users_skip_entitlements_and_grants() {
    let api = MockHubSpotApi::new().with_users(vec![user("u1")]);
    let connector = HubSpotConnector::new(Arc::new(api), &ConnectorConfig::new("test-token"));
    let syncer = connector.syncer(ResourceKind::User);
    let ctx = CallContext::new();

    assert!(syncer.resource_type().annotations.skips_entitlements_and_grants());

    let resource = syncer.list(&ctx, None, "").await.unwrap().items.remove(0);
    assert!(syncer.entitlements(&ctx, &resource, "").await.unwrap().items.is_empty());
    assert!(syncer.grants(&ctx, &resource, "").await.unwrap().items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn abandoned_scans_are_evicted_by_later_scans() {
    let api = MockHubSpotApi::new()
        .with_users(vec![user("u1"), user("u2")])
        .with_deactivated(&["u1", "u2"]);
    let registry = Arc::new(DeletedUserRegistry::with_idle_timeout(Duration::from_secs(600)));
    let connector =
        HubSpotConnector::with_registry(Arc::new(api), &config(1), Arc::clone(&registry));
    let syncer = connector.syncer(ResourceKind::User);
    let ctx = CallContext::new();

    // Each sync stops after its first deleted-scan page.
    for _ in 0..3 {
        let first = syncer.list(&ctx, None, "").await.unwrap();
        assert!(first.has_more());
    }
    assert_eq!(registry.active_lineages(), 3);

    tokio::time::advance(Duration::from_secs(601)).await;

    let pages = drain_list(syncer, &ctx, None).await;
    assert_eq!(statuses(&pages).len(), 2);
    assert_eq!(registry.active_lineages(), 0);
}
