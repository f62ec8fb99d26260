//! Opaque page tokens
//!
//! A page token encodes a stack of [`PageState`] frames. The top frame says
//! which resource is being paged and holds the remote cursor (or offset)
//! for it. Tokens are JSON, base64url encoded without padding, so they
//! survive being handed back verbatim by the orchestrator.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hubspot_sync_domain::{ConnectorError, ResourceId, Result};
use serde::{Deserialize, Serialize};

/// One frame of the pagination stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub resource_type_id: String,
    #[serde(default)]
    pub resource_id: String,
    /// Remote cursor for this frame. Empty on the first page.
    #[serde(default)]
    pub token: String,
}

impl PageState {
    pub fn for_resource(id: &ResourceId) -> Self {
        Self {
            resource_type_id: id.resource_type.clone(),
            resource_id: id.resource.clone(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    states: Vec<PageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<PageState>,
}

impl Bag {
    /// Decode `token`, seeding a fresh frame for `default` when it is empty.
    ///
    /// # Errors
    /// `InvalidPageToken` if the token does not decode, or if its current
    /// frame belongs to a different resource type than `default`. When
    /// `default` names a resource, the frame must name the same one.
    pub fn parse(token: &str, default: &ResourceId) -> Result<Self> {
        let mut bag = Self::unmarshal(token)?;

        match bag.current() {
            None => bag.push(PageState::for_resource(default)),
            Some(state) if state.resource_type_id != default.resource_type => {
                return Err(ConnectorError::InvalidPageToken(format!(
                    "token belongs to resource type '{}', expected '{}'",
                    state.resource_type_id, default.resource_type
                )));
            }
            Some(state)
                if !default.resource.is_empty() && state.resource_id != default.resource =>
            {
                return Err(ConnectorError::InvalidPageToken(format!(
                    "token belongs to {} '{}', expected '{}'",
                    default.resource_type, state.resource_id, default.resource
                )));
            }
            Some(_) => {}
        }

        Ok(bag)
    }

    /// # Errors
    /// `InvalidPageToken` on malformed base64 or JSON.
    pub fn unmarshal(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Ok(Self::default());
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| ConnectorError::InvalidPageToken(format!("not base64url: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ConnectorError::InvalidPageToken(format!("malformed state: {e}")))
    }

    /// Encode the bag. A bag with no current frame encodes to `""`.
    ///
    /// # Errors
    /// `Internal` if the state cannot be serialized.
    pub fn marshal(&self) -> Result<String> {
        if self.current.is_none() {
            return Ok(String::new());
        }

        let bytes = serde_json::to_vec(self)
            .map_err(|e| ConnectorError::Internal(format!("failed to encode page token: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn push(&mut self, state: PageState) {
        if let Some(previous) = self.current.take() {
            self.states.push(previous);
        }
        self.current = Some(state);
    }

    pub fn pop(&mut self) -> Option<PageState> {
        let popped = self.current.take();
        self.current = self.states.pop();
        popped
    }

    pub fn current(&self) -> Option<&PageState> {
        self.current.as_ref()
    }

    /// Remote cursor of the current frame, `""` if none.
    pub fn page_token(&self) -> &str {
        self.current.as_ref().map_or("", |state| state.token.as_str())
    }

    pub fn resource_type_id(&self) -> &str {
        self.current.as_ref().map_or("", |state| state.resource_type_id.as_str())
    }

    pub fn depth(&self) -> usize {
        self.states.len() + usize::from(self.current.is_some())
    }

    /// Finish the current frame and return the token for the next call.
    ///
    /// The frame is re-pushed with `next` as its cursor when `next` is
    /// non-empty; otherwise it is dropped and the token resumes the parent
    /// frame, or is `""` when the stack is exhausted.
    ///
    /// # Errors
    /// `InvalidPageToken` if there is no current frame.
    pub fn advance(&mut self, next: &str) -> Result<String> {
        let state = self
            .pop()
            .ok_or_else(|| ConnectorError::InvalidPageToken("no active page state".into()))?;

        if !next.is_empty() {
            self.push(PageState { token: next.to_string(), ..state });
        }

        self.marshal()
    }
}

/// Parse an offset stored as the cursor of a frame. `""` is offset zero.
///
/// # Errors
/// `InvalidPageToken` for anything that is not a non-negative integer.
pub fn parse_offset(cursor: &str) -> Result<usize> {
    if cursor.is_empty() {
        return Ok(0);
    }
    cursor
        .parse()
        .map_err(|_| ConnectorError::InvalidPageToken(format!("invalid offset '{cursor}'")))
}

#[cfg(test)]
mod tests {
    use hubspot_sync_domain::ResourceKind;

    use super::*;

    fn users() -> ResourceId {
        ResourceId::new(ResourceKind::User, "")
    }

    #[test]
    fn empty_token_seeds_default_frame() {
        let bag = Bag::parse("", &users()).unwrap();
        assert_eq!(bag.resource_type_id(), "user");
        assert_eq!(bag.page_token(), "");
        assert_eq!(bag.depth(), 1);
    }

    #[test]
    fn advance_carries_cursor_forward() {
        let mut bag = Bag::parse("", &users()).unwrap();
        let token = bag.advance("cursor-2").unwrap();
        assert!(!token.is_empty());
        assert!(!token.contains('='));

        let resumed = Bag::parse(&token, &users()).unwrap();
        assert_eq!(resumed.page_token(), "cursor-2");
        assert_eq!(resumed.depth(), 1);
    }

    #[test]
    fn advance_without_cursor_ends_paging() {
        let mut bag = Bag::parse("", &users()).unwrap();
        assert_eq!(bag.advance("").unwrap(), "");
        assert_eq!(bag.current(), None);
    }

    #[test]
    fn exhausted_child_frame_resumes_parent() {
        let mut bag = Bag::default();
        bag.push(PageState {
            resource_type_id: "team".into(),
            token: "p".into(),
            ..Default::default()
        });
        bag.push(PageState::for_resource(&users()));

        let token = bag.advance("").unwrap();
        let parent = Bag::unmarshal(&token).unwrap();
        assert_eq!(parent.resource_type_id(), "team");
        assert_eq!(parent.page_token(), "p");
    }

    #[test]
    fn advance_on_empty_bag_is_an_error() {
        assert!(matches!(
            Bag::default().advance("x"),
            Err(ConnectorError::InvalidPageToken(_))
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(matches!(Bag::parse("%%%", &users()), Err(ConnectorError::InvalidPageToken(_))));

        let not_json = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(matches!(
            Bag::parse(&not_json, &users()),
            Err(ConnectorError::InvalidPageToken(_))
        ));
    }

    #[test]
    fn token_for_other_resource_type_is_rejected() {
        let mut bag = Bag::parse("", &ResourceId::new(ResourceKind::Team, "t1")).unwrap();
        let token = bag.advance("5").unwrap();

        let err = Bag::parse(&token, &users()).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidPageToken(msg) if msg.contains("team")));
    }

    #[test]
    fn token_for_other_resource_is_rejected() {
        let mut bag = Bag::parse("", &ResourceId::new(ResourceKind::Team, "t1")).unwrap();
        let token = bag.advance("1").unwrap();

        let resumed = Bag::parse(&token, &ResourceId::new(ResourceKind::Team, "t1")).unwrap();
        assert_eq!(resumed.page_token(), "1");

        let err = Bag::parse(&token, &ResourceId::new(ResourceKind::Team, "t2")).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidPageToken(msg) if msg.contains("'t1'")));
    }

    #[test]
    fn offsets_parse_strictly() {
        assert_eq!(parse_offset("").unwrap(), 0);
        assert_eq!(parse_offset("40").unwrap(), 40);
        assert!(parse_offset("-1").is_err());
        assert!(parse_offset("abc").is_err());
    }
}
