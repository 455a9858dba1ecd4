//! Client configuration and backend profiles.

use std::time::Duration;

use base64::Engine;
use url::Url;

use crate::error::{Error, ErrorKind, Result};
use crate::redact::MAX_LOG_ENTRY_LENGTH;
use crate::retry::RetryConfig;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Retry configuration used by wrapped, repeatable operations.
    pub retry: RetryConfig,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to log requests and responses.
    pub enable_tracing: bool,
    /// Bodies longer than this many characters are truncated in logs.
    pub log_body_limit: usize,
    /// Accept self-signed certificates (staging backends).
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
            log_body_limit: MAX_LOG_ENTRY_LENGTH,
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Disable retries (a single attempt per operation).
    pub fn without_retry(mut self) -> Self {
        self.config.retry = RetryConfig::no_retry();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Set the body length after which log entries are truncated.
    pub fn with_log_body_limit(mut self, limit: usize) -> Self {
        self.config.log_body_limit = limit;
        self
    }

    /// Accept invalid TLS certificates.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// HTTP basic credentials guarding the backend's internal `i/` endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The `Authorization` header value.
    pub fn encoded(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

/// SOCKS proxy every call of a profile is routed through.
#[derive(Clone)]
pub struct ProxyConfig {
    url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ProxyConfig {
    /// Create a proxy config. A bare `host:port` is treated as SOCKS5.
    pub fn new(proxy: &str) -> Result<Self> {
        let url = if proxy.contains("://") {
            Url::parse(proxy)?
        } else {
            Url::parse(&format!("socks5h://{proxy}"))?
        };
        Ok(Self {
            url,
            username: None,
            password: None,
        })
    }

    /// Set proxy credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// The proxy URL with credentials embedded as userinfo.
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let mut url = self.url.clone();
        if let Some(ref username) = self.username {
            url.set_username(username)
                .map_err(|_| Error::config("proxy URL cannot carry credentials"))?;
            url.set_password(self.password.as_deref())
                .map_err(|_| Error::config("proxy URL cannot carry credentials"))?;
        }
        reqwest::Proxy::all(url.as_str()).map_err(Into::into)
    }
}

/// A named backend deployment the client talks to.
#[derive(Debug, Clone)]
pub struct BackendProfile {
    name: String,
    base_url: Url,
    domain: Option<String>,
    basic_auth: Option<BasicAuth>,
    proxy: Option<ProxyConfig>,
}

impl BackendProfile {
    /// Create a profile for the given backend origin.
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::new(ErrorKind::InvalidUrl(format!(
                "{base_url} cannot be used as a base URL"
            ))));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            name: name.into(),
            base_url,
            domain: None,
            basic_auth: None,
            proxy: None,
        })
    }

    /// Set the federation domain of this backend.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the basic credentials for internal endpoints.
    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.basic_auth = Some(auth);
        self
    }

    /// Route all calls through a SOCKS proxy.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Load a profile from environment variables.
    ///
    /// Required:
    /// - `BACKDOOR_URL`
    ///
    /// Optional:
    /// - `BACKDOOR_NAME` (default: "default")
    /// - `BACKDOOR_DOMAIN`
    /// - `BACKDOOR_BASIC_AUTH_USER` / `BACKDOOR_BASIC_AUTH_PASSWORD`
    /// - `BACKDOOR_SOCKS_PROXY`, `BACKDOOR_SOCKS_USER` / `BACKDOOR_SOCKS_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let base_url = var("BACKDOOR_URL")
            .ok_or_else(|| Error::config("environment variable BACKDOOR_URL is not set"))?;
        let name = var("BACKDOOR_NAME").unwrap_or_else(|| "default".to_string());

        let mut profile = Self::new(name, &base_url)?;

        if let Some(domain) = var("BACKDOOR_DOMAIN") {
            profile = profile.with_domain(domain);
        }
        if let (Some(user), Some(password)) = (
            var("BACKDOOR_BASIC_AUTH_USER"),
            var("BACKDOOR_BASIC_AUTH_PASSWORD"),
        ) {
            profile = profile.with_basic_auth(BasicAuth::new(user, password));
        }
        if let Some(proxy) = var("BACKDOOR_SOCKS_PROXY") {
            let mut proxy = ProxyConfig::new(&proxy)?;
            if let (Some(user), Some(password)) =
                (var("BACKDOOR_SOCKS_USER"), var("BACKDOOR_SOCKS_PASSWORD"))
            {
                proxy = proxy.with_credentials(user, password);
            }
            profile = profile.with_proxy(proxy);
        }

        Ok(profile)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn basic_auth(&self) -> Option<&BasicAuth> {
        self.basic_auth.as_ref()
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    /// Resolve a request target against the base URL.
    ///
    /// Absolute `http(s)://` targets are used as-is; anything else is a path
    /// relative to the backend origin.
    pub fn url(&self, target: &str) -> Result<Url> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Url::parse(target).map_err(Into::into);
        }
        self.base_url
            .join(target.trim_start_matches('/'))
            .map_err(Into::into)
    }
}
