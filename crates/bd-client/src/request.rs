//! HTTP request building with per-call acceptable statuses.

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;
use crate::multipart::MultipartBody;
use crate::redact;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Head => reqwest::Method::HEAD,
        }
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes { data: Bytes, content_type: String },
}

/// Builder for a single backend call.
///
/// `acceptable` is part of each call's contract: a response whose status is
/// listed is returned to the caller even when it is a 4xx.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) target: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) authorization: Option<String>,
    pub(crate) cookie: Option<String>,
    pub(crate) accept: String,
    pub(crate) acceptable: Vec<u16>,
    pub(crate) backdoor: bool,
}

impl RequestBuilder {
    /// Create a request for a path relative to the backend origin, or an
    /// absolute URL.
    pub fn new(method: RequestMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: None,
            authorization: None,
            cookie: None,
            accept: "application/json".to_string(),
            acceptable: vec![200],
            backdoor: false,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, target)
    }

    pub fn put(target: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, target)
    }

    /// Authorize with `Bearer <token>`.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.token_auth("Bearer", token)
    }

    /// Authorize with `<token_type> <token>` as reported by the backend.
    pub fn token_auth(mut self, token_type: &str, token: impl AsRef<str>) -> Self {
        self.authorization = Some(format!("{token_type} {}", token.as_ref()));
        self
    }

    /// Send a session cookie.
    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookie = Some(format!("{name}={value}"));
        self
    }

    /// Attach the profile's basic credentials for internal endpoints.
    pub fn backdoor(mut self) -> Self {
        self.backdoor = true;
        self
    }

    /// Statuses that count as a successful outcome for this call.
    pub fn acceptable(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.acceptable = statuses.into_iter().collect();
        self
    }

    /// Set the Accept header (defaults to `application/json`).
    pub fn accept(mut self, mime: impl Into<String>) -> Self {
        self.accept = mime.into();
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((name.into(), value.to_string()));
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Set raw JSON body.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set a raw body with its content type.
    pub fn bytes(mut self, data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Bytes {
            data: data.into(),
            content_type: content_type.into(),
        });
        self
    }

    /// Set an encoded multipart asset body.
    pub fn multipart(self, body: MultipartBody) -> Self {
        let MultipartBody {
            content_type, body, ..
        } = body;
        self.bytes(body, content_type)
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn acceptable_statuses(&self) -> &[u16] {
        &self.acceptable
    }

    pub(crate) fn is_acceptable(&self, status: u16) -> bool {
        self.acceptable.contains(&status)
    }

    /// Full request body, redacted, for trace logging.
    pub(crate) fn body_for_trace(&self) -> Option<String> {
        self.render_body(redact::for_trace)
    }

    /// Request body shortened and redacted for regular logging.
    pub(crate) fn body_for_log(&self, limit: usize) -> Option<String> {
        self.render_body(|body| redact::for_log(body, limit))
    }

    fn render_body(&self, render: impl Fn(&[u8]) -> String) -> Option<String> {
        match self.body.as_ref()? {
            RequestBody::Json(value) => Some(render(value.to_string().as_bytes())),
            RequestBody::Bytes { data, content_type } if content_type.contains("json") => {
                Some(render(data))
            }
            RequestBody::Bytes { data, content_type } => {
                Some(format!("<{} bytes of {content_type}>", data.len()))
            }
        }
    }
}
