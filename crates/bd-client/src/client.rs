//! Request executor: one HTTP call classified against the caller's
//! acceptable statuses.

use std::time::Instant;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};

use crate::config::{BackendProfile, ClientConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::redact;
use crate::request::{RequestBody, RequestBuilder};
use crate::response::{RequestOutcome, ResponseCookie};
use crate::retry::RetryPolicy;

/// HTTP client bound to one backend profile.
///
/// Cloning is cheap. Idle connections are never kept, so every call opens
/// and releases its own connection.
#[derive(Debug, Clone)]
pub struct BackdoorHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    profile: BackendProfile,
}

impl BackdoorHttpClient {
    /// Create a new client for the given backend.
    pub fn new(profile: BackendProfile, config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(0)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true);

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy) = profile.proxy() {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            config,
            profile,
        })
    }

    /// Create a client with default configuration.
    pub fn with_profile(profile: BackendProfile) -> Result<Self> {
        Self::new(profile, ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the backend profile.
    pub fn profile(&self) -> &BackendProfile {
        &self.profile
    }

    /// The bounded retry policy configured for this client.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.retry)
    }

    /// Perform exactly one call.
    ///
    /// Statuses listed in the request's acceptable set are returned as an
    /// outcome, whatever their numeric class. Any other status is an
    /// [`ErrorKind::Http`] carrying the status and whatever body could be
    /// read.
    #[instrument(
        skip(self, request),
        fields(method = ?request.method, target = %request.target)
    )]
    pub async fn execute(&self, request: RequestBuilder) -> Result<RequestOutcome> {
        let mut url = self.profile.url(&request.target)?;
        if !request.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query_params);
        }

        let mut req = self
            .inner
            .request(request.method.to_reqwest(), url.clone())
            .header(ACCEPT, request.accept.as_str());

        if request.backdoor {
            let auth = self.profile.basic_auth().ok_or_else(|| {
                Error::config(format!(
                    "backend profile '{}' has no basic auth for internal endpoints",
                    self.profile.name()
                ))
            })?;
            req = req.header(AUTHORIZATION, auth.encoded());
        } else if let Some(ref authorization) = request.authorization {
            req = req.header(AUTHORIZATION, authorization.as_str());
        }

        if let Some(ref cookie) = request.cookie {
            req = req.header(COOKIE, cookie.as_str());
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.json(value),
                RequestBody::Bytes { data, content_type } => req
                    .header(CONTENT_TYPE, content_type.as_str())
                    .body(data.clone()),
            };
        }

        if self.config.enable_tracing {
            debug!(
                url = %url,
                body = ?request.body_for_log(self.config.log_body_limit),
                "Sending request"
            );
            trace!(body = ?request.body_for_trace(), "Full request body");
        }

        let started = Instant::now();
        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        if !request.is_acceptable(status) {
            // Best-effort read; a failed read must not hide the status.
            let body = match response.bytes().await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    debug!(error = %e, "Failed to read error body");
                    String::new()
                }
            };
            if self.config.enable_tracing {
                warn!(
                    status,
                    expected = ?request.acceptable,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    body = %redact::for_log(body.as_bytes(), self.config.log_body_limit),
                    "Unexpected response status"
                );
            }
            return Err(Error::new(ErrorKind::Http {
                status,
                expected: request.acceptable,
                body,
            }));
        }

        let cookies: Vec<ResponseCookie> = response.cookies().map(ResponseCookie::from).collect();
        let body = response.bytes().await?;

        if self.config.enable_tracing {
            debug!(
                status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                body = %redact::for_log(&body, self.config.log_body_limit),
                "Response received"
            );
            trace!(body = %redact::for_trace(&body), "Full response body");
        }

        Ok(RequestOutcome::new(status, headers, body, cookies))
    }

    /// Execute a call and deserialize the JSON response.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.execute(request).await?.json()
    }
}
