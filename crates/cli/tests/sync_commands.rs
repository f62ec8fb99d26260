//! Full sync and manual provisioning against a mock HubSpot portal

use std::sync::Arc;

use hubspot_sync_cli::commands::{grant, revoke, run_full_sync, ProvisionTarget};
use hubspot_sync_core::{CallContext, HubSpotConnector};
use hubspot_sync_domain::{ConnectorConfig, ConnectorError, ResourceKind};
use hubspot_sync_infra::HubSpotClient;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn u1() -> Value {
    json!({"id": "u1", "email": "ada@example.com", "roleIds": ["r1"], "primaryTeamId": "t1"})
}

fn u2() -> Value {
    json!({
        "id": "u2",
        "email": "grace@example.com",
        "primaryTeamId": "t1",
        "secondaryTeamIds": ["t2"]
    })
}

async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("X-HubSpot-RateLimit-Remaining", "150")
                .insert_header("X-HubSpot-RateLimit-Max", "190"),
        )
        .mount(server)
        .await;
}

async fn portal() -> MockServer {
    let server = MockServer::start().await;
    mount_get(&server, "/account-info/v3/details", json!({"portalId": 4242})).await;
    mount_get(&server, "/settings/v3/users", json!({"results": [u1(), u2()]})).await;
    mount_get(&server, "/settings/v3/users/u1", u1()).await;
    mount_get(&server, "/settings/v3/users/u2", u2()).await;
    mount_get(
        &server,
        "/settings/v3/users/teams",
        json!({"results": [
            {"id": "t1", "name": "Sales", "userIds": ["u1", "u2"], "secondaryUserIds": []},
            {"id": "t2", "name": "Support", "userIds": [], "secondaryUserIds": ["u2"]},
            {"id": "t3", "name": "Success"}
        ]}),
    )
    .await;
    mount_get(
        &server,
        "/settings/v3/users/roles",
        json!({"results": [{"id": "r1", "name": "sales rep"}, {"id": "r2", "name": "admin"}]}),
    )
    .await;
    server
}

fn setup(server: &MockServer) -> (Arc<HubSpotClient>, HubSpotConnector) {
    let config = ConnectorConfig::new("pat-test").with_base_url(server.uri());
    let client = Arc::new(HubSpotClient::new(&config).expect("client"));
    let connector = HubSpotConnector::new(client.clone(), &config);
    (client, connector)
}

#[tokio::test]
async fn full_sync_counts_everything() {
    let server = portal().await;
    let (_, connector) = setup(&server);

    let summary = run_full_sync(&connector, &CallContext::new()).await.unwrap();

    let account = &summary.resource_types["account"];
    assert_eq!(account.resources, 1);
    // member + one permission per role
    assert_eq!(account.entitlements, 3);
    // two members, u1 holds r1
    assert_eq!(account.grants, 3);

    let team = &summary.resource_types["team"];
    assert_eq!((team.resources, team.entitlements, team.grants), (3, 6, 3));

    let role = &summary.resource_types["role"];
    assert_eq!((role.resources, role.entitlements, role.grants), (2, 2, 1));

    let user = &summary.resource_types["user"];
    assert_eq!((user.resources, user.entitlements, user.grants), (2, 0, 0));

    assert_eq!(summary.total_resources(), 8);
    assert_eq!(summary.total_grants(), 7);
    assert!(summary.warnings.is_empty());
    assert_eq!(summary.rate_limit.as_ref().map(|r| r.limit), Some(190));
}

#[tokio::test]
async fn full_sync_reports_missing_roles_as_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings/v3/users/roles"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_get(&server, "/account-info/v3/details", json!({"portalId": 7})).await;
    mount_get(&server, "/settings/v3/users", json!({"results": [u1()]})).await;
    mount_get(&server, "/settings/v3/users/teams", json!({"results": []})).await;
    let (_, connector) = setup(&server);

    let summary = run_full_sync(&connector, &CallContext::new()).await.unwrap();

    assert_eq!(summary.resource_types["role"].resources, 0);
    assert_eq!(summary.resource_types["account"].entitlements, 1);
    assert!(!summary.warnings.is_empty());
}

#[tokio::test]
async fn grant_secondary_team_keeps_other_relationships() {
    let server = portal().await;
    Mock::given(method("PUT"))
        .and(path("/settings/v3/users/u1"))
        .and(body_json(json!({
            "roleId": "r1",
            "primaryTeamId": "t1",
            "secondaryTeamIds": ["t3"]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let (client, connector) = setup(&server);

    let target = ProvisionTarget {
        user_id: "u1".into(),
        kind: ResourceKind::Team,
        resource_id: "t3".into(),
        slug: "secondary-member".into(),
    };
    let outcome =
        grant(&connector, client.as_ref(), &CallContext::new(), &target).await.unwrap();

    assert_eq!(outcome.action, "grant");
    assert_eq!(outcome.grant_id, "team:t3:secondary-member:user:u1");
}

#[tokio::test]
async fn revoke_missing_membership_sends_no_update() {
    let server = portal().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (client, connector) = setup(&server);

    let target = ProvisionTarget {
        user_id: "u1".into(),
        kind: ResourceKind::Role,
        resource_id: "r2".into(),
        slug: "member".into(),
    };
    let err =
        revoke(&connector, client.as_ref(), &CallContext::new(), &target).await.unwrap_err();

    assert!(matches!(err.root(), ConnectorError::NotRoleMember { .. }));
}

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let server = portal().await;
    let (client, connector) = setup(&server);

    let target = ProvisionTarget {
        user_id: "u1".into(),
        kind: ResourceKind::Team,
        resource_id: "t404".into(),
        slug: "primary-member".into(),
    };
    let err = grant(&connector, client.as_ref(), &CallContext::new(), &target).await.unwrap_err();

    assert_eq!(err, ConnectorError::NotFound("team t404".into()));
}
