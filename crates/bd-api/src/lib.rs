//! # backdoor-api
//!
//! Typed operations against a chat backend's test API, performed on behalf
//! of simulated users:
//!
//! - **Users**: registration with email activation, self profile, handles
//! - **Connections**: paged listing (with the legacy fallback), requests,
//!   status changes, accepting everything pending
//! - **Conversations**: paged id listing, batched lookups, group creation
//! - **Teams**: teams, members and roles, invitations
//! - **Devices**: listing and removal
//! - **Feature flags**: per-user view, backdoor overrides, waiting for a
//!   flag to converge
//! - **Assets**: multipart upload and download
//!
//! ## Example
//!
//! ```rust,ignore
//! use backdoor_api::{BackendClient, FeatureStatus};
//! use backdoor_auth::NewUser;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), backdoor_api::Error> {
//!     let backend = BackendClient::from_env()?;
//!
//!     let alice = backend
//!         .register_personal_user(&NewUser::new("alice@example.com", "Alice", "s3cret"))
//!         .await?;
//!
//!     backend
//!         .wait_for_feature_status(
//!             &alice,
//!             "fileSharing",
//!             FeatureStatus::Enabled,
//!             Duration::from_secs(30),
//!             Duration::from_secs(1),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod assets;
mod client;
pub mod connections;
pub mod conversations;
pub mod devices;
mod error;
pub mod features;
pub mod teams;
mod types;
pub mod users;

pub use client::BackendClient;

pub use assets::{AssetKey, AssetMetadata, Retention};
pub use connections::{Connection, ConnectionStatus};
pub use conversations::{Conversation, NewGroup, CONVERSATION_LIST_BATCH};
pub use devices::Device;
pub use error::{Error, ErrorKind, Result};
pub use features::{FeatureConfig, FeatureConfigs, FeatureStatus, LockStatus};
pub use teams::{Invitation, NewInvitation, Team, TeamMember, TeamRole};
pub use types::QualifiedId;
pub use users::{SelfUser, UserProfile};

// Re-export the types callers need alongside the client
pub use backdoor_auth::{NewUser, SessionManager, UserAccount};
pub use backdoor_client::{BackdoorHttpClient, BackendProfile, ClientConfig, RetryPolicy};
