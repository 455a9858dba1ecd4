//! End-to-end scenarios against a mock backend.
//!
//! Every scenario starts its own `wiremock` server, so the suite runs with a
//! plain `cargo test --test integration`. Set `RUST_LOG=debug` to see the
//! request logs.

#[path = "integration/common.rs"]
mod common;
#[path = "integration/session.rs"]
mod session;
#[path = "integration/pagination.rs"]
mod pagination;
#[path = "integration/assets.rs"]
mod assets;
#[path = "integration/features.rs"]
mod features;
