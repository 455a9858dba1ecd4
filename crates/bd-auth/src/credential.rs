//! Credentials of simulated end users.
//!
//! A [`Credential`] is immutable: login and refresh produce a new value that
//! replaces the stored one wholesale. All types here redact secrets in
//! their Debug output.

use std::time::Duration;

use backdoor_client::ResponseCookie;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

/// A token is treated as expired this long before the server-reported
/// expiry so it cannot lapse while a request is in flight.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Name of the backend's long-lived session cookie.
pub const SESSION_COOKIE_NAME: &str = "zuid";

/// Short-lived bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    pub fn new(
        value: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value: value.into(),
            token_type: token_type.into(),
            expires_at,
        }
    }

    /// Build a token from a relative `expires_in` (seconds) observed at `now`.
    pub fn expiring_in(
        value: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let lifetime = TimeDelta::try_seconds(expires_in).unwrap_or_else(TimeDelta::zero);
        let expires_at = now.checked_add_signed(lifetime).unwrap_or(now);
        Self::new(value, token_type, expires_at)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once `now + skew` has reached the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        let skew = TimeDelta::from_std(skew).unwrap_or_else(|_| TimeDelta::zero());
        now + skew >= self.expires_at
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.value)
    }
}

/// Long-lived cookie used to obtain new access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

impl From<&ResponseCookie> for SessionCookie {
    fn from(cookie: &ResponseCookie) -> Self {
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            attributes: cookie.attributes.clone(),
        }
    }
}

/// Usability of a credential at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Token present and not expired.
    Usable,
    /// Token present but expired.
    Expired,
    /// No token (a cookie may still be present).
    Absent,
}

/// Access token plus session cookie of one logical user session.
///
/// A cookie without a token needs a refresh before use; a token without a
/// cookie is usable until it expires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    access_token: Option<AccessToken>,
    cookie: Option<SessionCookie>,
}

impl Credential {
    pub fn new(access_token: Option<AccessToken>, cookie: Option<SessionCookie>) -> Self {
        Self {
            access_token,
            cookie,
        }
    }

    /// A credential holding only a session cookie (e.g. right after registration).
    pub fn cookie_only(cookie: SessionCookie) -> Self {
        Self::new(None, Some(cookie))
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn cookie(&self) -> Option<&SessionCookie> {
        self.cookie.as_ref()
    }

    pub fn state_at(&self, now: DateTime<Utc>, skew: Duration) -> CredentialState {
        match &self.access_token {
            None => CredentialState::Absent,
            Some(token) if token.is_expired_at(now, skew) => CredentialState::Expired,
            Some(_) => CredentialState::Usable,
        }
    }

    pub fn state(&self) -> CredentialState {
        self.state_at(Utc::now(), DEFAULT_EXPIRY_SKEW)
    }

    /// The same session without its access token, forcing a refresh.
    pub fn without_token(&self) -> Self {
        Self::new(None, self.cookie.clone())
    }

    /// Header value for authenticated calls.
    pub fn authorization(&self) -> Result<String> {
        self.access_token
            .as_ref()
            .map(AccessToken::authorization)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidCredentials(
                    "credential has no access token".to_string(),
                ))
            })
    }
}

/// Token payload returned by `/login` and `/access`.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

impl TokenResponse {
    pub fn into_token(self, now: DateTime<Utc>) -> AccessToken {
        AccessToken::expiring_in(self.access_token, self.token_type, self.expires_in, now)
    }
}

/// Key under which a session's credential is stored: the lower-cased email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(email: &str) -> Self {
        Self(email.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A simulated end user.
#[derive(Clone)]
pub struct UserAccount {
    pub email: String,
    password: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl UserAccount {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            id: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Load an account from `BACKDOOR_USER_EMAIL` / `BACKDOOR_USER_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("BACKDOOR_USER_EMAIL")
            .map_err(|_| Error::new(ErrorKind::EnvVar("BACKDOOR_USER_EMAIL".to_string())))?;
        let password = std::env::var("BACKDOOR_USER_PASSWORD")
            .map_err(|_| Error::new(ErrorKind::EnvVar("BACKDOOR_USER_PASSWORD".to_string())))?;
        Ok(Self::new(email, password))
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(&self.email)
    }
}
