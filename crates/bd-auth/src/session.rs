//! Per-user credential store with single-flight refresh.
//!
//! Each [`SessionKey`] owns an async mutex around its current credential.
//! A caller that finds the credential unusable holds that mutex while it
//! logs in or refreshes, so concurrent callers for the same user wait and
//! then observe the fresh credential. Different users never share a lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument};

use crate::client::AuthClient;
use crate::credential::{Credential, CredentialState, SessionKey, UserAccount};
use crate::error::Result;

type Slot = Arc<AsyncMutex<Option<Arc<Credential>>>>;

/// Keeps one credential per simulated user and keeps it usable.
#[derive(Debug)]
pub struct SessionManager {
    auth: AuthClient,
    sessions: Mutex<HashMap<SessionKey, Slot>>,
}

impl SessionManager {
    pub fn new(auth: AuthClient) -> Self {
        Self {
            auth,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    fn slot(&self, key: &SessionKey) -> Slot {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.entry(key.clone()).or_default().clone()
    }

    fn existing_slot(&self, key: &SessionKey) -> Option<Slot> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(key).cloned()
    }

    /// Return a credential with an unexpired access token for `account`.
    ///
    /// A usable stored credential is returned without network I/O. A missing
    /// credential triggers a login; an expired or absent token triggers a
    /// refresh through the session cookie, or a login when there is none.
    #[instrument(skip(self, account), fields(session = %account.session_key()))]
    pub async fn ensure_usable(&self, account: &UserAccount) -> Result<Arc<Credential>> {
        let slot = self.slot(&account.session_key());
        let mut current = slot.lock().await;
        let skew = self.auth.config().expiry_skew;

        if let Some(credential) = current.as_ref() {
            if credential.state_at(Utc::now(), skew) == CredentialState::Usable {
                debug!("Reusing stored credential");
                return Ok(Arc::clone(credential));
            }
        }

        let next = match current.as_deref() {
            Some(credential) if credential.cookie().is_some() => {
                info!(state = ?credential.state_at(Utc::now(), skew), "Refreshing access token");
                self.auth.refresh(credential).await?
            }
            Some(_) => {
                info!("No session cookie, logging in again");
                self.auth.login(account).await?
            }
            None => {
                info!("No stored credential, logging in");
                self.auth.login(account).await?
            }
        };

        let next = Arc::new(next);
        *current = Some(Arc::clone(&next));
        Ok(next)
    }

    /// Replace the stored credential for `key`.
    pub async fn store(&self, key: &SessionKey, credential: Credential) {
        let slot = self.slot(key);
        *slot.lock().await = Some(Arc::new(credential));
    }

    /// The stored credential for `key`, usable or not.
    pub async fn credential(&self, key: &SessionKey) -> Option<Arc<Credential>> {
        let slot = self.existing_slot(key)?;
        let current = slot.lock().await;
        current.clone()
    }

    /// Drop the access token for `key`, forcing a refresh on next use.
    pub async fn invalidate(&self, key: &SessionKey) {
        if let Some(slot) = self.existing_slot(key) {
            let mut current = slot.lock().await;
            if let Some(credential) = current.as_deref() {
                *current = Some(Arc::new(credential.without_token()));
            }
        }
    }

    /// Drop the access token for `key` only if it is still `rejected`.
    ///
    /// Returns whether the stored token was dropped. A token that another
    /// caller already replaced is left alone.
    pub async fn invalidate_if(&self, key: &SessionKey, rejected: &str) -> bool {
        let Some(slot) = self.existing_slot(key) else {
            return false;
        };
        let mut current = slot.lock().await;
        let Some(credential) = current.as_deref() else {
            return false;
        };
        if credential.access_token().map(|token| token.value()) != Some(rejected) {
            return false;
        }
        *current = Some(Arc::new(credential.without_token()));
        true
    }

    /// Remove everything stored for `key`.
    pub fn forget(&self, key: &SessionKey) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(key).is_some()
    }

    /// Log `account` out on the backend and forget its session.
    #[instrument(skip(self, account), fields(session = %account.session_key()))]
    pub async fn logout(&self, account: &UserAccount) -> Result<()> {
        let key = account.session_key();
        if let Some(credential) = self.credential(&key).await {
            self.auth.logout(&credential).await?;
        }
        self.forget(&key);
        Ok(())
    }

    /// Keys of all sessions currently stored.
    pub fn sessions(&self) -> Vec<SessionKey> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<_> = sessions.keys().cloned().collect();
        keys.sort();
        keys
    }
}
