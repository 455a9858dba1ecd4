//! Sources of one-time codes for the two-factor login challenge.

use backdoor_client::{BackdoorHttpClient, RequestBuilder};
use futures::future::BoxFuture;
use tracing::instrument;

use crate::credential::UserAccount;
use crate::error::{Error, ErrorKind, Result};

/// Supplies the verification code the backend sent for a login challenge.
pub trait VerificationCodeSource: Send + Sync + std::fmt::Debug {
    fn code<'a>(&'a self, account: &'a UserAccount) -> BoxFuture<'a, Result<String>>;
}

/// Always answers with the same code.
#[derive(Debug, Clone)]
pub struct StaticCode(String);

impl StaticCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl VerificationCodeSource for StaticCode {
    fn code<'a>(&'a self, _account: &'a UserAccount) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

/// Reads the pending login code from the backend's internal endpoint.
///
/// Requires the account's user id and the profile's basic auth.
#[derive(Debug, Clone)]
pub struct BackdoorCodeSource {
    http: BackdoorHttpClient,
}

impl BackdoorCodeSource {
    pub fn new(http: BackdoorHttpClient) -> Self {
        Self { http }
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn fetch(&self, account: &UserAccount) -> Result<String> {
        let id = account.id.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::VerificationCode(format!(
                "user id of {} is unknown",
                account.email
            )))
        })?;

        let path = format!(
            "i/users/{}/verification-code/login",
            urlencoding::encode(id)
        );
        let outcome = self
            .http
            .execute(RequestBuilder::get(path).backdoor())
            .await?;

        let code = outcome.text().trim().trim_matches('"').to_string();
        if code.is_empty() {
            return Err(Error::new(ErrorKind::VerificationCode(
                "backend returned an empty code".to_string(),
            )));
        }
        Ok(code)
    }
}

impl VerificationCodeSource for BackdoorCodeSource {
    fn code<'a>(&'a self, account: &'a UserAccount) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.fetch(account))
    }
}
