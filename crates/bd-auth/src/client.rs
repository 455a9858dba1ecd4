//! Login, two-factor, refresh, registration and logout flows.

use std::sync::Arc;
use std::time::Duration;

use backdoor_client::{
    BackdoorHttpClient, ErrorKind as ClientErrorKind, RequestBuilder, RequestOutcome,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::code_source::{BackdoorCodeSource, VerificationCodeSource};
use crate::credential::{
    Credential, SessionCookie, TokenResponse, UserAccount, DEFAULT_EXPIRY_SKEW,
    SESSION_COOKIE_NAME,
};
use crate::error::{Error, ErrorKind, Result};

/// Label the backend uses to ask for a second factor.
const CODE_REQUIRED_LABEL: &str = "code-authentication-required";

/// Settings shared by all authentication flows.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Client label sent with `/login`.
    pub label: String,
    /// Tokens closer than this to expiry are treated as expired.
    pub expiry_skew: Duration,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            expiry_skew: DEFAULT_EXPIRY_SKEW,
            cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }
}

/// A user to create with `/register`.
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
        }
    }

    /// The account to log in with once the user exists.
    pub fn account(&self, id: impl Into<String>) -> UserAccount {
        UserAccount::new(&self.email, &self.password)
            .with_id(id)
            .with_name(&self.name)
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: String,
    /// Cookie-only credential issued with the registration response.
    pub credential: Credential,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_code: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    id: String,
}

/// Authentication flows against one backend.
#[derive(Clone)]
pub struct AuthClient {
    http: BackdoorHttpClient,
    config: AuthConfig,
    code_source: Arc<dyn VerificationCodeSource>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("profile", &self.http.profile().name())
            .field("config", &self.config)
            .field("code_source", &self.code_source)
            .finish()
    }
}

impl AuthClient {
    /// Create an auth client reading second-factor codes from the backdoor.
    pub fn new(http: BackdoorHttpClient) -> Self {
        let code_source = Arc::new(BackdoorCodeSource::new(http.clone()));
        Self {
            http,
            config: AuthConfig::default(),
            code_source,
        }
    }

    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_code_source(mut self, source: impl VerificationCodeSource + 'static) -> Self {
        self.code_source = Arc::new(source);
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn http(&self) -> &BackdoorHttpClient {
        &self.http
    }

    /// Exchange email and password for a credential.
    ///
    /// A 403 carrying the code-required label triggers the two-factor
    /// sub-flow: a code is requested, obtained from the configured source
    /// and submitted with a second login.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn login(&self, account: &UserAccount) -> Result<Credential> {
        let outcome = self
            .post_login(account, None, [200, 403])
            .await
            .map_err(auth_failure)?;

        if outcome.status() == 200 {
            info!("Logged in");
            return self.credential_from(&outcome, None);
        }

        let body: ErrorBody = outcome.json().unwrap_or_default();
        if body.label.as_deref() != Some(CODE_REQUIRED_LABEL) {
            return Err(Error::new(ErrorKind::Authentication {
                status: outcome.status(),
                message: body.label.or(body.message).unwrap_or_default(),
            }));
        }

        info!("Login requires a verification code");
        self.send_verification_code(&account.email).await?;
        let code = self.code_source.code(account).await?;

        let outcome = self
            .post_login(account, Some(&code), [200])
            .await
            .map_err(auth_failure)?;
        info!("Logged in with verification code");
        self.credential_from(&outcome, None)
    }

    /// Exchange the session cookie (plus the stale token, if any) for a new
    /// access token. The previous cookie is kept unless the response sets a
    /// new one.
    #[instrument(skip(self, credential))]
    pub async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let cookie = credential.cookie().ok_or_else(|| {
            Error::new(ErrorKind::InvalidCredentials(
                "no session cookie to refresh with".to_string(),
            ))
        })?;

        let mut request = RequestBuilder::post("access")
            .json_value(json!({"withCredentials": true}))
            .cookie(cookie.name(), cookie.value());
        if let Some(token) = credential.access_token() {
            request = request.token_auth(token.token_type(), token.value());
        }

        let outcome = self.http.execute(request).await.map_err(auth_failure)?;
        let refreshed = self.credential_from(&outcome, Some(cookie))?;
        debug!(
            cookie_rotated = refreshed.cookie() != Some(cookie),
            "Access token refreshed"
        );
        Ok(refreshed)
    }

    /// Ask the backend to send a login verification code.
    #[instrument(skip(self))]
    pub async fn send_verification_code(&self, email: &str) -> Result<()> {
        let outcome = self
            .http
            .execute(
                RequestBuilder::post("v5/verification-code/send")
                    .json_value(json!({"action": "login", "email": email}))
                    .acceptable([200, 429]),
            )
            .await?;
        if outcome.status() == 429 {
            debug!("Verification code already sent recently");
        }
        Ok(())
    }

    /// Create a user.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<Registration> {
        let outcome = self
            .http
            .execute(RequestBuilder::post("register").json(user)?.acceptable([201]))
            .await?;

        let body: RegisterResponse = outcome.json()?;
        let cookie = outcome
            .cookie(&self.config.cookie_name)
            .map(SessionCookie::from);
        info!(user_id = %body.id, "Registered user");

        Ok(Registration {
            user_id: body.id,
            credential: Credential::new(None, cookie),
        })
    }

    /// Invalidate the session on the backend.
    #[instrument(skip(self, credential))]
    pub async fn logout(&self, credential: &Credential) -> Result<()> {
        let token = credential.access_token().ok_or_else(|| {
            Error::new(ErrorKind::InvalidCredentials(
                "logout requires an access token".to_string(),
            ))
        })?;
        let cookie = credential.cookie().ok_or_else(|| {
            Error::new(ErrorKind::InvalidCredentials(
                "logout requires a session cookie".to_string(),
            ))
        })?;

        self.http
            .execute(
                RequestBuilder::post("access/logout")
                    .token_auth(token.token_type(), token.value())
                    .cookie(cookie.name(), cookie.value())
                    .json_value(json!({})),
            )
            .await?;
        Ok(())
    }

    /// Whether `/login` accepts these credentials without a challenge.
    #[instrument(skip(self, password))]
    pub async fn is_login_possible(&self, email: &str, password: &str) -> Result<bool> {
        let account = UserAccount::new(email, password);
        let outcome = self.post_login(&account, None, 100..600).await?;
        Ok(outcome.status() == 200)
    }

    async fn post_login(
        &self,
        account: &UserAccount,
        verification_code: Option<&str>,
        acceptable: impl IntoIterator<Item = u16>,
    ) -> backdoor_client::Result<RequestOutcome> {
        let request = RequestBuilder::post("login")
            .json(&LoginRequest {
                email: &account.email,
                password: account.password(),
                label: &self.config.label,
                verification_code,
            })?
            .acceptable(acceptable);
        self.http.execute(request).await
    }

    fn credential_from(
        &self,
        outcome: &RequestOutcome,
        previous_cookie: Option<&SessionCookie>,
    ) -> Result<Credential> {
        let token: TokenResponse = outcome.json()?;
        let cookie = outcome
            .cookie(&self.config.cookie_name)
            .map(SessionCookie::from)
            .or_else(|| previous_cookie.cloned());
        Ok(Credential::new(Some(token.into_token(Utc::now())), cookie))
    }
}

/// Unacceptable statuses of login/refresh are authentication failures;
/// transport problems stay client errors.
fn auth_failure(err: backdoor_client::Error) -> Error {
    match err.kind {
        ClientErrorKind::Http { status, ref body, .. } => {
            let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
            let message = parsed
                .label
                .or(parsed.message)
                .unwrap_or_else(|| body.clone());
            Error::with_source(ErrorKind::Authentication { status, message }, err)
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_source::StaticCode;
    use crate::credential::CredentialState;
    use backdoor_client::{BackendProfile, ClientConfig};
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_for(server: &MockServer) -> AuthClient {
        let profile = BackendProfile::new("test", &server.uri()).unwrap();
        let http = BackdoorHttpClient::new(profile, ClientConfig::default()).unwrap();
        AuthClient::new(http).with_code_source(StaticCode::new("123456"))
    }

    fn token_body(token: &str) -> serde_json::Value {
        json!({"access_token": token, "token_type": "Bearer", "expires_in": 900, "user": "u1"})
    }

    #[tokio::test]
    async fn test_login_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"email": "a@b.c", "password": "pw", "label": ""})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "zuid=cookie-1; Path=/access; HttpOnly")
                    .set_body_json(token_body("token-1")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let cred = auth_for(&mock_server)
            .login(&UserAccount::new("a@b.c", "pw"))
            .await
            .unwrap();

        assert_eq!(cred.state(), CredentialState::Usable);
        assert_eq!(cred.access_token().unwrap().value(), "token-1");
        assert_eq!(cred.cookie().unwrap().value(), "cookie-1");
    }

    #[tokio::test]
    async fn test_login_with_second_factor() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_partial_json(json!({"verification_code": "123456"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "zuid=cookie-2fa")
                    .set_body_json(token_body("token-2fa")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"code": 403, "label": "code-authentication-required"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v5/verification-code/send"))
            .and(body_json(json!({"action": "login", "email": "a@b.c"})))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cred = auth_for(&mock_server)
            .login(&UserAccount::new("a@b.c", "pw"))
            .await
            .unwrap();
        assert_eq!(cred.access_token().unwrap().value(), "token-2fa");
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"label": "invalid-credentials"})),
            )
            .mount(&mock_server)
            .await;

        let err = auth_for(&mock_server)
            .login(&UserAccount::new("a@b.c", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.kind,
            ErrorKind::Authentication { status: 403, ref message } if message == "invalid-credentials"
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_login_server_error_is_authentication_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let err = auth_for(&mock_server)
            .login(&UserAccount::new("a@b.c", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.is_auth_error());
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_refresh_keeps_cookie_when_not_rotated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/access"))
            .and(header("Cookie", "zuid=old-cookie"))
            .and(header("Authorization", "Bearer stale"))
            .and(body_json(json!({"withCredentials": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let stale = Credential::new(
            Some(crate::credential::AccessToken::expiring_in(
                "stale",
                "Bearer",
                -10,
                Utc::now(),
            )),
            Some(SessionCookie::new("zuid", "old-cookie")),
        );

        let cred = auth_for(&mock_server).refresh(&stale).await.unwrap();
        assert_eq!(cred.access_token().unwrap().value(), "fresh");
        assert_eq!(cred.cookie().unwrap().value(), "old-cookie");
    }

    #[tokio::test]
    async fn test_refresh_replaces_rotated_cookie() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/access"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "zuid=new-cookie; Path=/access")
                    .set_body_json(token_body("fresh")),
            )
            .mount(&mock_server)
            .await;

        let cred = auth_for(&mock_server)
            .refresh(&Credential::cookie_only(SessionCookie::new("zuid", "old")))
            .await
            .unwrap();
        assert_eq!(cred.cookie().unwrap().value(), "new-cookie");
    }

    #[tokio::test]
    async fn test_refresh_requires_cookie() {
        let mock_server = MockServer::start().await;
        let err = auth_for(&mock_server)
            .refresh(&Credential::default())
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/access"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"label": "invalid-credentials"})))
            .mount(&mock_server)
            .await;

        let err = auth_for(&mock_server)
            .refresh(&Credential::cookie_only(SessionCookie::new("zuid", "expired")))
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_register() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(json!({"email": "n@b.c", "name": "New", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Set-Cookie", "zuid=reg-cookie")
                    .set_body_json(json!({"id": "u-new"})),
            )
            .mount(&mock_server)
            .await;

        let registration = auth_for(&mock_server)
            .register(&NewUser::new("n@b.c", "New", "pw"))
            .await
            .unwrap();
        assert_eq!(registration.user_id, "u-new");
        assert_eq!(registration.credential.state(), CredentialState::Absent);
        assert_eq!(registration.credential.cookie().unwrap().value(), "reg-cookie");
    }

    #[tokio::test]
    async fn test_logout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/access/logout"))
            .and(header("Authorization", "Bearer tok"))
            .and(header("Cookie", "zuid=c"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cred = Credential::new(
            Some(crate::credential::AccessToken::expiring_in("tok", "Bearer", 900, Utc::now())),
            Some(SessionCookie::new("zuid", "c")),
        );
        auth_for(&mock_server).logout(&cred).await.unwrap();
    }

    #[tokio::test]
    async fn test_is_login_possible() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_partial_json(json!({"password": "right"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t")))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let auth = auth_for(&mock_server);
        assert!(auth.is_login_possible("a@b.c", "right").await.unwrap());
        assert!(!auth.is_login_possible("a@b.c", "wrong").await.unwrap());
    }
}
