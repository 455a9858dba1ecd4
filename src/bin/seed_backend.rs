//! Seed a test backend with connected users.
//!
//! Usage: `seed-backend alice@example.com:pw1 bob@example.com:pw2 ...`
//!
//! Each user is logged in, or registered and activated when the backend
//! does not know them yet. Every pair of users is then connected and the
//! resulting conversation and connection counts are printed.
//!
//! The backend comes from `BACKDOOR_URL`, `BACKDOOR_BASIC_AUTH_USER`,
//! `BACKDOOR_BASIC_AUTH_PASSWORD` and the optional `BACKDOOR_SOCKS_*` and
//! `BACKDOOR_DOMAIN` variables. Set `RUST_LOG=backdoor=debug` for request
//! logs.

use anyhow::{bail, Context, Result};
use backdoor::api::{QualifiedId, SelfUser};
use backdoor::{BackendClient, NewUser, UserAccount};
use futures::future::try_join_all;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Seeded {
    account: UserAccount,
    user: SelfUser,
}

impl Seeded {
    fn qualified_id(&self, default_domain: &str) -> QualifiedId {
        self.user
            .qualified_id
            .clone()
            .unwrap_or_else(|| QualifiedId::new(self.user.id, default_domain))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let users = parse_users(std::env::args().skip(1))?;
    if users.is_empty() {
        bail!("usage: seed-backend EMAIL:PASSWORD [EMAIL:PASSWORD ...]");
    }

    let backend = BackendClient::from_env().context("backend configuration")?;
    let domain = backend.domain()?.to_string();
    println!("Seeding {} users on {domain}", users.len());

    let mut seeded = Vec::with_capacity(users.len());
    for (email, password) in &users {
        seeded.push(sign_in(&backend, email, password).await?);
    }

    for (i, from) in seeded.iter().enumerate() {
        for to in &seeded[i + 1..] {
            backend
                .send_connection_request(&from.account, &to.qualified_id(&domain), &to.user.name)
                .await
                .with_context(|| format!("connect {} to {}", from.account.email, to.account.email))?;
        }
    }
    for user in &seeded {
        let accepted = backend.accept_all_incoming(&user.account).await?;
        info!(email = %user.account.email, accepted, "Accepted pending requests");
    }

    let counts = try_join_all(seeded.iter().map(|user| {
        let backend = &backend;
        async move {
            let conversations = backend.list_conversation_ids(&user.account).await?;
            let connections = backend.list_connections(&user.account).await?;
            Ok::<_, backdoor::api::Error>((conversations.len(), connections.len()))
        }
    }))
    .await?;

    for (user, (conversations, connections)) in seeded.iter().zip(counts) {
        println!(
            "  {}: {conversations} conversations, {connections} connections",
            user.account.email
        );
    }
    Ok(())
}

fn parse_users(args: impl Iterator<Item = String>) -> Result<Vec<(String, String)>> {
    args.map(|arg| match arg.split_once(':') {
        Some((email, password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email.to_string(), password.to_string()))
        }
        _ => bail!("expected EMAIL:PASSWORD, got {arg:?}"),
    })
    .collect()
}

async fn sign_in(backend: &BackendClient, email: &str, password: &str) -> Result<Seeded> {
    let account = if backend.auth().is_login_possible(email, password).await? {
        println!("  {email}: existing user");
        UserAccount::new(email, password)
    } else {
        let name = email.split('@').next().unwrap_or(email);
        let account = backend
            .register_personal_user(&NewUser::new(email, name, password))
            .await
            .with_context(|| format!("register {email}"))?;
        println!("  {email}: registered");
        account
    };

    let user = backend.self_user(&account).await?;
    let account = account.with_id(user.id.to_string()).with_name(user.name.clone());
    Ok(Seeded { account, user })
}
