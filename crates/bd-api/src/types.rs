//! Identifiers shared by several resources.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A backend-wide identifier: the object id plus the owning backend's domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct QualifiedId {
    pub id: Uuid,
    pub domain: String,
}

impl QualifiedId {
    pub fn new(id: Uuid, domain: impl Into<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
        }
    }

    /// Path segment form `{domain}/{id}`.
    pub(crate) fn path(&self) -> String {
        format!("{}/{}", urlencoding::encode(&self.domain), self.id)
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.domain)
    }
}
