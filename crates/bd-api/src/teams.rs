//! Team, membership and invitation types.

use backdoor_client::{IntoPage, Page};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page size used when walking invitations.
pub const INVITATION_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub creator: Option<Uuid>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// Role of a team member, identified by its permission bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Owner,
    Admin,
    Member,
    Partner,
}

impl TeamRole {
    pub fn permission_bits(self) -> u64 {
        match self {
            Self::Owner => 8191,
            Self::Admin => 5951,
            Self::Member => 1587,
            Self::Partner => 1025,
        }
    }

    pub fn from_permission_bits(bits: u64) -> Option<Self> {
        [Self::Owner, Self::Admin, Self::Member, Self::Partner]
            .into_iter()
            .find(|role| role.permission_bits() == bits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Permissions {
    #[serde(rename = "self")]
    pub own: u64,
    pub copy: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamMember {
    pub user: Uuid,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

impl TeamMember {
    /// The member's role, if the permissions match a known role.
    pub fn role(&self) -> Option<TeamRole> {
        self.permissions
            .and_then(|p| TeamRole::from_permission_bits(p.own))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MembersResponse {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: Option<TeamRole>,
    #[serde(default)]
    pub team: Option<Uuid>,
    #[serde(default)]
    pub inviter_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `GET /teams/{tid}/invitations`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InvitationsPage {
    #[serde(default)]
    pub invitations: Vec<Invitation>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl IntoPage<Invitation> for InvitationsPage {
    fn into_page(self) -> backdoor_client::Result<Page<Invitation>> {
        Page::from_last_id(self.invitations, self.has_more, |inv| inv.id.to_string())
    }
}

/// Request body of `POST /teams/{tid}/invitations`.
#[derive(Debug, Clone, Serialize)]
pub struct NewInvitation {
    pub email: String,
    pub role: TeamRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inviter_name: Option<String>,
}

impl NewInvitation {
    pub fn new(email: impl Into<String>, role: TeamRole) -> Self {
        Self {
            email: email.into(),
            role,
            inviter_name: None,
        }
    }

    pub fn from_inviter(mut self, name: impl Into<String>) -> Self {
        self.inviter_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_permissions() {
        let member: TeamMember = serde_json::from_value(json!({
            "user": "00000000-0000-0000-0000-00000000000a",
            "permissions": {"self": 5951, "copy": 5951}
        }))
        .unwrap();
        assert_eq!(member.role(), Some(TeamRole::Admin));
        assert_eq!(TeamRole::from_permission_bits(1234), None);
    }

    #[test]
    fn test_invitations_page_cursor_is_last_id() {
        let page: InvitationsPage = serde_json::from_value(json!({
            "invitations": [
                {"id": "00000000-0000-0000-0000-000000000001", "email": "a@b.c"},
                {"id": "00000000-0000-0000-0000-000000000002", "email": "d@e.f"}
            ],
            "has_more": true
        }))
        .unwrap();
        let page = page.into_page().unwrap();
        assert_eq!(
            page.cursor.as_deref(),
            Some("00000000-0000-0000-0000-000000000002")
        );
    }
}
