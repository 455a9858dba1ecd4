//! # backdoor-auth
//!
//! Credentials of simulated end users for end-to-end test suites.
//!
//! - [`AuthClient`] runs the login (with the two-factor challenge), refresh,
//!   registration and logout flows against a test backend.
//! - [`SessionManager`] keeps one [`Credential`] per user and refreshes it on
//!   demand, at most once at a time per user.
//!
//! Tokens, cookies and passwords are redacted in Debug output and never
//! appear in error messages or logs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use backdoor_auth::{AuthClient, SessionManager, UserAccount};
//! use backdoor_client::{BackdoorHttpClient, BackendProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = BackdoorHttpClient::with_profile(BackendProfile::from_env()?)?;
//!     let sessions = SessionManager::new(AuthClient::new(http));
//!
//!     let alice = UserAccount::new("alice@example.com", "s3cret");
//!     let credential = sessions.ensure_usable(&alice).await?;
//!     println!("{:?}", credential.state());
//!     Ok(())
//! }
//! ```

mod client;
mod code_source;
mod credential;
mod error;
mod session;

pub use client::{AuthClient, AuthConfig, NewUser, Registration};
pub use code_source::{BackdoorCodeSource, StaticCode, VerificationCodeSource};
pub use credential::{
    AccessToken, Credential, CredentialState, SessionCookie, SessionKey, TokenResponse,
    UserAccount, DEFAULT_EXPIRY_SKEW, SESSION_COOKIE_NAME,
};
pub use error::{Error, ErrorKind, Result};
pub use session::SessionManager;
