use backdoor_auth::{NewUser, UserAccount};
use backdoor_client::RequestBuilder;
use tracing::{info, instrument};

use crate::error::Result;
use crate::types::QualifiedId;
use crate::users::{Activation, ActivationCode, HandleUpdate, SelfUser, UserProfile};

impl super::BackendClient {
    /// Create a user without activating its email.
    ///
    /// The registration cookie is stored as the user's session, so the
    /// first authenticated call refreshes instead of logging in.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<UserAccount> {
        let registration = self.auth().register(user).await?;
        let account = user.account(registration.user_id);
        self.sessions()
            .store(&account.session_key(), registration.credential)
            .await;
        Ok(account)
    }

    /// Create a personal user and activate its email with the code read
    /// from the backdoor.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register_personal_user(&self, user: &NewUser) -> Result<UserAccount> {
        let account = self.register(user).await?;
        let code = self.activation_code(&user.email).await?;
        self.activate(&user.email, &code).await?;
        info!(user_id = ?account.id, "Personal user registered and activated");
        Ok(account)
    }

    /// Pending email activation code (backdoor).
    #[instrument(skip(self))]
    pub async fn activation_code(&self, email: &str) -> Result<String> {
        let outcome = self
            .backdoor(|| RequestBuilder::get("i/users/activation-code").query("email", email))
            .await?;
        let body: ActivationCode = outcome.json()?;
        Ok(body.code)
    }

    #[instrument(skip(self, code))]
    pub async fn activate(&self, email: &str, code: &str) -> Result<()> {
        let body = serde_json::to_value(Activation {
            email,
            code,
            dryrun: false,
        })?;
        self.http()
            .execute(RequestBuilder::post("activate").json_value(body))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn self_user(&self, account: &UserAccount) -> Result<SelfUser> {
        self.authed_json(account, || RequestBuilder::get("self")).await
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn user_profile(&self, account: &UserAccount, user: &QualifiedId) -> Result<UserProfile> {
        let target = format!("users/{}", user.path());
        self.authed_json(account, || RequestBuilder::get(target.as_str()))
            .await
    }

    /// Set the user's unique handle.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn update_handle(&self, account: &UserAccount, handle: &str) -> Result<()> {
        let body = serde_json::to_value(HandleUpdate { handle })?;
        self.authed(account, || {
            RequestBuilder::put("self/handle").json_value(body.clone())
        })
        .await?;
        Ok(())
    }
}
