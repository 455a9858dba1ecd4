//! Fully-read HTTP responses.

use std::time::SystemTime;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A cookie received via `Set-Cookie`.
#[derive(Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    /// Attributes in a fixed order; flag attributes carry an empty value.
    pub attributes: Vec<(String, String)>,
    pub expires: Option<SystemTime>,
}

impl std::fmt::Debug for ResponseCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("attributes", &self.attributes)
            .field("expires", &self.expires)
            .finish()
    }
}

impl ResponseCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: Vec::new(),
            expires: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl From<reqwest::cookie::Cookie<'_>> for ResponseCookie {
    fn from(cookie: reqwest::cookie::Cookie<'_>) -> Self {
        let mut parsed = Self::new(cookie.name(), cookie.value());
        if let Some(path) = cookie.path() {
            parsed = parsed.with_attribute("Path", path);
        }
        if let Some(domain) = cookie.domain() {
            parsed = parsed.with_attribute("Domain", domain);
        }
        if let Some(max_age) = cookie.max_age() {
            parsed = parsed.with_attribute("Max-Age", max_age.as_secs().to_string());
        }
        if cookie.same_site_strict() {
            parsed = parsed.with_attribute("SameSite", "Strict");
        } else if cookie.same_site_lax() {
            parsed = parsed.with_attribute("SameSite", "Lax");
        }
        if cookie.http_only() {
            parsed = parsed.with_attribute("HttpOnly", "");
        }
        if cookie.secure() {
            parsed = parsed.with_attribute("Secure", "");
        }
        parsed.expires = cookie.expires();
        parsed
    }
}

/// The result of one executed call whose status was acceptable.
///
/// The body has already been read in full, so the connection is released
/// by the time the caller sees this value.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    cookies: Vec<ResponseCookie>,
}

impl RequestOutcome {
    pub(crate) fn new(
        status: u16,
        headers: HeaderMap,
        body: Bytes,
        cookies: Vec<ResponseCookie>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            cookies,
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the outcome and return the body.
    pub fn bytes(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8 (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// All cookies set by this response.
    pub fn cookies(&self) -> &[ResponseCookie] {
        &self.cookies
    }

    /// The last cookie with the given name set by this response.
    pub fn cookie(&self, name: &str) -> Option<&ResponseCookie> {
        self.cookies.iter().rev().find(|c| c.name == name)
    }
}
