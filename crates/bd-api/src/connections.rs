//! Connection (contact request) types.

use std::fmt;

use backdoor_client::{IntoPage, Page};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::QualifiedId;

/// State of a connection between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Accepted,
    Blocked,
    Pending,
    Ignored,
    Sent,
    Cancelled,
    #[serde(rename = "missing-legalhold-consent")]
    MissingLegalholdConsent,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::Accepted => "accepted",
            Self::Blocked => "blocked",
            Self::Pending => "pending",
            Self::Ignored => "ignored",
            Self::Sent => "sent",
            Self::Cancelled => "cancelled",
            Self::MissingLegalholdConsent => "missing-legalhold-consent",
        };
        f.write_str(status)
    }
}

/// A connection as seen by the listing user.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Connection {
    pub from: Uuid,
    pub to: Uuid,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub qualified_to: Option<QualifiedId>,
    #[serde(default)]
    pub conversation: Option<Uuid>,
    #[serde(default)]
    pub last_update: Option<String>,
}

impl Connection {
    /// The other user, falling back to `default_domain` on servers that do
    /// not qualify ids.
    pub fn other_user(&self, default_domain: &str) -> QualifiedId {
        self.qualified_to
            .clone()
            .unwrap_or_else(|| QualifiedId::new(self.to, default_domain))
    }
}

/// Response of `POST /list-connections`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConnectionsPage {
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub paging_state: Option<String>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl IntoPage<Connection> for ConnectionsPage {
    fn into_page(self) -> backdoor_client::Result<Page<Connection>> {
        Page::from_paging_state(self.connections, self.paging_state, self.has_more)
    }
}

/// Response of the legacy `GET /connections`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LegacyConnections {
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListConnectionsRequest<'a> {
    pub paging_state: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: ConnectionStatus,
}

/// Body of the legacy `POST /connections`.
#[derive(Debug, Serialize)]
pub(crate) struct LegacyConnectionRequest<'a> {
    pub user: Uuid,
    pub name: &'a str,
    pub message: &'a str,
}
