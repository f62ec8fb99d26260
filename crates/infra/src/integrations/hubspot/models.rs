//! Wire shapes of the HubSpot endpoints
//!
//! Records shared with the sync engine (`User`, `Team`, `Role`, `Account`)
//! come from the domain crate; only the envelopes and the CRM search DTOs are
//! defined here.

use hubspot_sync_domain::{Role, Team, User};
use serde::{Deserialize, Serialize};

/// Property holding the settings-API user id on a CRM user object.
pub const INTERNAL_USER_ID_PROPERTY: &str = "hs_internal_user_id";
/// Property flagging a deactivated CRM user object.
pub const DEACTIVATED_PROPERTY: &str = "hs_deactivated";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<NextPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NextPage {
    #[serde(default)]
    pub after: String,
    #[serde(default)]
    pub link: Option<String>,
}

fn next_cursor(paging: Option<&Paging>) -> String {
    paging.and_then(|p| p.next.as_ref()).map(|next| next.after.clone()).unwrap_or_default()
}

/// `GET settings/v3/users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub results: Vec<User>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl UsersResponse {
    /// Cursor of the next page, empty on the last one.
    pub fn next_cursor(&self) -> String {
        next_cursor(self.paging.as_ref())
    }
}

/// `GET settings/v3/users/teams`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub results: Vec<Team>,
}

/// `GET settings/v3/users/roles`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolesResponse {
    #[serde(default)]
    pub results: Vec<Role>,
}

// ============================================================================
// CRM users search
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub filter_groups: Vec<FilterGroup>,
    pub properties: Vec<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub after: String,
}

impl SearchRequest {
    /// Search for deactivated users, returning only their internal user id.
    pub fn deactivated_users(limit: u32, after: &str) -> Self {
        Self {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: DEACTIVATED_PROPERTY.to_string(),
                    operator: "EQ".to_string(),
                    value: "true".to_string(),
                }],
            }],
            properties: vec![INTERNAL_USER_ID_PROPERTY.to_string()],
            limit,
            after: after.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: String,
    pub operator: String,
    pub value: String,
}

/// `POST crm/v3/objects/users/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub properties: SearchProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchProperties {
    #[serde(default)]
    pub hs_internal_user_id: Option<String>,
}

impl SearchResponse {
    pub fn next_cursor(&self) -> String {
        next_cursor(self.paging.as_ref())
    }

    /// Internal user ids of the results; objects without one are dropped.
    pub fn user_ids(self) -> Vec<String> {
        self.results
            .into_iter()
            .filter_map(|result| result.properties.hs_internal_user_id)
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn users_response_without_paging_is_last_page() {
        let response: UsersResponse =
            serde_json::from_value(json!({"results": [{"id": "1", "email": "a@b.c"}]})).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.next_cursor(), "");
    }

    #[test]
    fn users_response_reads_next_cursor() {
        let response: UsersResponse = serde_json::from_value(json!({
            "results": [],
            "paging": {"next": {"after": "MTA=", "link": "https://api.hubapi.com/..."}}
        }))
        .unwrap();
        assert_eq!(response.next_cursor(), "MTA=");
    }

    #[test]
    fn search_request_shape() {
        let body = serde_json::to_value(SearchRequest::deactivated_users(25, "")).unwrap();
        assert_eq!(
            body,
            json!({
                "filterGroups": [{"filters": [
                    {"propertyName": "hs_deactivated", "operator": "EQ", "value": "true"}
                ]}],
                "properties": ["hs_internal_user_id"],
                "limit": 25
            })
        );

        let body = serde_json::to_value(SearchRequest::deactivated_users(25, "50")).unwrap();
        assert_eq!(body["after"], "50");
    }

    #[test]
    fn search_response_extracts_user_ids() {
        let response: SearchResponse = serde_json::from_value(json!({
            "total": 3,
            "results": [
                {"id": "901", "properties": {"hs_internal_user_id": "11"}},
                {"id": "902", "properties": {"hs_internal_user_id": null}},
                {"id": "903", "properties": {"hs_internal_user_id": "13"}}
            ],
            "paging": {"next": {"after": "3"}}
        }))
        .unwrap();

        assert_eq!(response.next_cursor(), "3");
        assert_eq!(response.user_ids(), vec!["11".to_string(), "13".to_string()]);
    }
}
