//! Conversation types.

use backdoor_client::{IntoPage, Page};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::QualifiedId;

/// Upper bound on `qualified_ids` per `v4/conversations/list` request.
pub const CONVERSATION_LIST_BATCH: usize = 1000;

/// A conversation as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Conversation {
    pub qualified_id: QualifiedId,
    #[serde(default)]
    pub name: Option<String>,
    /// Numeric conversation type (0 group, 1 self, 2 one-to-one, 3 connect).
    #[serde(rename = "type", default)]
    pub kind: Option<u8>,
    #[serde(default)]
    pub team: Option<Uuid>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub members: Option<serde_json::Value>,
}

/// Response of `POST /conversations/list-ids`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConversationIdsPage {
    #[serde(default)]
    pub qualified_conversations: Vec<QualifiedId>,
    #[serde(default)]
    pub paging_state: Option<String>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl IntoPage<QualifiedId> for ConversationIdsPage {
    fn into_page(self) -> backdoor_client::Result<Page<QualifiedId>> {
        Page::from_paging_state(self.qualified_conversations, self.paging_state, self.has_more)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListIdsRequest<'a> {
    pub paging_state: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListConversationsRequest<'a> {
    pub qualified_ids: &'a [QualifiedId],
}

/// Response of `POST /v4/conversations/list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConversationsFound {
    #[serde(default)]
    pub found: Vec<Conversation>,
    #[serde(default)]
    pub not_found: Vec<QualifiedId>,
    #[serde(default)]
    pub failed: Vec<QualifiedId>,
}

/// Request to create a group conversation.
#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub users: Vec<Uuid>,
    pub qualified_users: Vec<QualifiedId>,
    pub conversation_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamInfo {
    pub teamid: Uuid,
    pub managed: bool,
}

impl NewGroup {
    /// A group named `name`; members are added with the member role.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            users: Vec::new(),
            qualified_users: Vec::new(),
            conversation_role: "wire_member".to_string(),
            team: None,
        }
    }

    /// Add a member. Users of `local_domain` go in `users`, others are
    /// sent qualified.
    pub fn with_member(mut self, member: QualifiedId, local_domain: &str) -> Self {
        if member.domain == local_domain {
            self.users.push(member.id);
        } else {
            self.qualified_users.push(member);
        }
        self
    }

    pub fn in_team(mut self, team: Uuid) -> Self {
        self.team = Some(TeamInfo {
            teamid: team,
            managed: false,
        });
        self
    }
}
