//! # backdoor-client
//!
//! Core HTTP infrastructure for talking to a chat backend's test API.
//!
//! This crate provides:
//! - A request executor with a per-call whitelist of acceptable statuses
//! - Bounded and deadline-based retry policies
//! - A pagination walker for cursor and last-id paged endpoints
//! - A `multipart/mixed` encoder for asset uploads
//! - Request/response tracing with truncated, redacted bodies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (backdoor-auth, backdoor-api)                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          RetryPolicy / walk_pages / MultipartAsset          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   BackdoorHttpClient                        │
//! │  - One call per execute, acceptable-status classification   │
//! │  - Backend profile: base URL, basic auth, SOCKS proxy       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use backdoor_client::{BackdoorHttpClient, BackendProfile, RequestBuilder, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), backdoor_client::Error> {
//!     let client = BackdoorHttpClient::with_profile(BackendProfile::from_env()?)?;
//!
//!     let outcome = RetryPolicy::default()
//!         .run(|| client.execute(RequestBuilder::get("api-version")))
//!         .await?;
//!     println!("{}", outcome.text());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod multipart;
pub mod pagination;
mod request;
pub mod redact;
mod response;
mod retry;

pub use client::BackdoorHttpClient;
pub use config::{BackendProfile, BasicAuth, ClientConfig, ClientConfigBuilder, ProxyConfig};
pub use error::{Error, ErrorKind, Result, Retryable};
pub use multipart::{MultipartAsset, MultipartBody, DEFAULT_BOUNDARY};
pub use pagination::{walk_batches, walk_pages, IntoPage, Page};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::{RequestOutcome, ResponseCookie};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("backdoor-client/", env!("CARGO_PKG_VERSION"));
