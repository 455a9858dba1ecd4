//! Typed backend client.
//!
//! [`BackendClient`] combines the request executor with a
//! [`SessionManager`]: every user-scoped call first makes sure the user's
//! credential is usable, then sends the request with that user's token. The
//! resource operations live in the submodules, one per backend area.

use std::sync::Arc;

use backdoor_auth::{AuthClient, SessionManager, UserAccount};
use backdoor_client::{
    BackdoorHttpClient, BackendProfile, RequestBuilder, RequestOutcome, RetryPolicy,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

mod assets;
mod connections;
mod conversations;
mod devices;
mod features;
mod teams;
mod users;

/// Test-backend client acting on behalf of simulated users.
///
/// # Example
///
/// ```rust,ignore
/// use backdoor_api::BackendClient;
/// use backdoor_auth::UserAccount;
///
/// let backend = BackendClient::from_env()?;
/// let alice = UserAccount::new("alice@example.com", "s3cret");
///
/// for conversation in backend.list_conversations(&alice).await? {
///     println!("{:?}", conversation.name);
/// }
/// backend.accept_all_incoming(&alice).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: BackdoorHttpClient,
    sessions: Arc<SessionManager>,
    retry: RetryPolicy,
}

impl BackendClient {
    /// Create a client with its own session store.
    pub fn new(http: BackdoorHttpClient) -> Self {
        let sessions = Arc::new(SessionManager::new(AuthClient::new(http.clone())));
        Self::with_sessions(http, sessions)
    }

    /// Create a client sharing an existing session store.
    pub fn with_sessions(http: BackdoorHttpClient, sessions: Arc<SessionManager>) -> Self {
        let retry = http.retry_policy();
        Self {
            http,
            sessions,
            retry,
        }
    }

    /// Create a client for the backend described by `BACKDOOR_*` variables.
    pub fn from_env() -> Result<Self> {
        let profile = BackendProfile::from_env()?;
        Ok(Self::new(BackdoorHttpClient::with_profile(profile)?))
    }

    /// Replace the retry policy wrapped around idempotent calls.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn http(&self) -> &BackdoorHttpClient {
        &self.http
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn auth(&self) -> &AuthClient {
        self.sessions.auth()
    }

    /// The backend's federation domain, or its host when none is configured.
    pub fn domain(&self) -> Result<&str> {
        let profile = self.http.profile();
        profile
            .domain()
            .or_else(|| profile.base_url().host_str())
            .ok_or_else(|| {
                backdoor_client::Error::config(format!(
                    "backend {} has no domain",
                    profile.name()
                ))
                .into()
            })
    }

    /// Send a user-scoped request under the default retry policy.
    pub(crate) async fn authed<F>(&self, account: &UserAccount, build: F) -> Result<RequestOutcome>
    where
        F: Fn() -> RequestBuilder,
    {
        self.authed_with(&self.retry, account, build).await
    }

    /// Send a user-scoped request that must not be repeated.
    pub(crate) async fn authed_once<F>(
        &self,
        account: &UserAccount,
        build: F,
    ) -> Result<RequestOutcome>
    where
        F: Fn() -> RequestBuilder,
    {
        self.authed_with(&RetryPolicy::none(), account, build).await
    }

    pub(crate) async fn authed_json<T, F>(&self, account: &UserAccount, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        Ok(self.authed(account, build).await?.json()?)
    }

    /// A 401 drops the rejected token, if still stored, so that the next
    /// attempt refreshes it.
    pub(crate) async fn authed_with<F>(
        &self,
        policy: &RetryPolicy,
        account: &UserAccount,
        build: F,
    ) -> Result<RequestOutcome>
    where
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        policy
            .run(|| async move {
                let credential = self.sessions.ensure_usable(account).await?;
                let token = credential.access_token().ok_or_else(|| {
                    backdoor_auth::Error::new(backdoor_auth::ErrorKind::InvalidCredentials(
                        "session has no access token".to_string(),
                    ))
                })?;

                let request = build().token_auth(token.token_type(), token.value());
                match self.http.execute(request).await {
                    Ok(outcome) => Ok(outcome),
                    Err(err) => {
                        if err.status() == Some(401) {
                            let key = account.session_key();
                            if self.sessions.invalidate_if(&key, token.value()).await {
                                debug!(session = %key, "Token rejected, invalidating");
                            }
                        }
                        Err(Error::from(err))
                    }
                }
            })
            .await
    }

    /// Send a request to an internal endpoint with the backdoor credentials.
    pub(crate) async fn backdoor<F>(&self, build: F) -> Result<RequestOutcome>
    where
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        self.retry
            .run(|| async move {
                self.http
                    .execute(build().backdoor())
                    .await
                    .map_err(Error::from)
            })
            .await
    }
}
