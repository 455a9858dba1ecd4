//! User account types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::QualifiedId;

/// The logged-in user's own profile (`GET /self`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelfUser {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub team: Option<Uuid>,
    #[serde(default)]
    pub qualified_id: Option<QualifiedId>,
}

/// Another user's public profile (`GET /users/{domain}/{id}`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    pub qualified_id: QualifiedId,
    pub name: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub team: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivationCode {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Activation<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub dryrun: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct HandleUpdate<'a> {
    pub handle: &'a str,
}
