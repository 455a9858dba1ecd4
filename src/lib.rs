//! # backdoor
//!
//! Client for a chat backend's test ("backdoor") API, used by end-to-end UI
//! test suites to set up and verify server state for simulated users.
//!
//! Tokens, cookies and passwords are redacted in Debug output, skipped by
//! tracing spans and stripped from error messages.
//!
//! ## Crates
//!
//! - **backdoor-client** - Request executor, retry policy, pagination walker,
//!   multipart asset encoder, backend profiles
//! - **backdoor-auth** - Login (with two-factor), refresh, registration and
//!   per-user session management
//! - **backdoor-api** - Typed operations: users, connections, conversations,
//!   teams, devices, feature flags, assets
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use backdoor::{BackendClient, UserAccount};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // BACKDOOR_URL, BACKDOOR_BASIC_AUTH_USER, ...
//!     let backend = BackendClient::from_env()?;
//!
//!     let alice = UserAccount::new("alice@example.com", "s3cret");
//!     let accepted = backend.accept_all_incoming(&alice).await?;
//!     println!("accepted {accepted} requests");
//!
//!     for conversation in backend.list_conversations(&alice).await? {
//!         println!("{:?}", conversation.name);
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(feature = "api")]
pub use backdoor_api as api;
#[cfg(feature = "auth")]
pub use backdoor_auth as auth;
#[cfg(feature = "client")]
pub use backdoor_client as client;

#[cfg(feature = "api")]
pub use backdoor_api::BackendClient;
#[cfg(feature = "auth")]
pub use backdoor_auth::{AuthClient, Credential, NewUser, SessionManager, UserAccount};
#[cfg(feature = "client")]
pub use backdoor_client::{BackdoorHttpClient, BackendProfile, ClientConfig, RetryPolicy};
