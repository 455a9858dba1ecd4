use backdoor_auth::UserAccount;
use backdoor_client::{walk_pages, IntoPage, Page, RequestBuilder};
use tracing::{debug, info, instrument};

use crate::connections::{
    Connection, ConnectionStatus, ConnectionsPage, LegacyConnectionRequest, LegacyConnections,
    ListConnectionsRequest, StatusUpdate,
};
use crate::error::{Error, Result};
use crate::types::QualifiedId;

impl super::BackendClient {
    /// All connections of `account`, across every page.
    ///
    /// Backends without `/list-connections` answer 404 on the first page;
    /// their unpaged `GET /connections` listing is used instead. A 404 on a
    /// later page is an error.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn list_connections(&self, account: &UserAccount) -> Result<Vec<Connection>> {
        walk_pages(|cursor| async move { self.connections_page(account, cursor).await }).await
    }

    async fn connections_page(
        &self,
        account: &UserAccount,
        cursor: Option<String>,
    ) -> Result<Page<Connection>> {
        let body = serde_json::to_value(ListConnectionsRequest {
            paging_state: cursor.as_deref(),
        })?;
        let outcome = self
            .authed(account, || {
                RequestBuilder::post("list-connections")
                    .json_value(body.clone())
                    .acceptable([200, 404])
            })
            .await?;

        if outcome.status() == 404 {
            if let Some(cursor) = cursor {
                return Err(Error::protocol(format!(
                    "list-connections answered 404 for paging state {cursor:?}"
                )));
            }
            debug!("list-connections unavailable, using legacy listing");
            let legacy: LegacyConnections = self
                .authed_json(account, || RequestBuilder::get("connections"))
                .await?;
            return Ok(Page::single(legacy.connections));
        }

        Ok(outcome.json::<ConnectionsPage>()?.into_page()?)
    }

    /// Send a connection request from `account` to `to`.
    #[instrument(skip(self, account, to_name), fields(email = %account.email, to = %to))]
    pub async fn send_connection_request(
        &self,
        account: &UserAccount,
        to: &QualifiedId,
        to_name: &str,
    ) -> Result<()> {
        let target = format!("connections/{}", to.path());
        let outcome = self
            .authed(account, || {
                RequestBuilder::post(target.as_str()).acceptable([200, 201, 404])
            })
            .await?;

        if outcome.status() == 404 {
            debug!("Qualified connections unavailable, using legacy endpoint");
            let body = serde_json::to_value(LegacyConnectionRequest {
                user: to.id,
                name: to_name,
                message: " ",
            })?;
            self.authed(account, || {
                RequestBuilder::post("connections")
                    .json_value(body.clone())
                    .acceptable([200, 201])
            })
            .await?;
        }
        Ok(())
    }

    /// Change the status of the connection between `account` and `to`.
    #[instrument(skip(self, account), fields(email = %account.email, to = %to))]
    pub async fn update_connection(
        &self,
        account: &UserAccount,
        to: &QualifiedId,
        status: ConnectionStatus,
    ) -> Result<()> {
        let body = serde_json::to_value(StatusUpdate { status })?;
        let target = format!("connections/{}", to.path());
        let outcome = self
            .authed(account, || {
                RequestBuilder::put(target.as_str())
                    .json_value(body.clone())
                    .acceptable([200, 204, 404])
            })
            .await?;

        if outcome.status() == 404 {
            let legacy = format!("connections/{}", to.id);
            self.authed(account, || {
                RequestBuilder::put(legacy.as_str())
                    .json_value(body.clone())
                    .acceptable([200, 204])
            })
            .await?;
        }
        Ok(())
    }

    /// Accept every pending incoming request. Returns how many were accepted.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn accept_all_incoming(&self, account: &UserAccount) -> Result<usize> {
        let domain = self.domain()?.to_string();
        let pending: Vec<_> = self
            .list_connections(account)
            .await?
            .into_iter()
            .filter(|c| c.status == ConnectionStatus::Pending)
            .collect();

        for connection in &pending {
            self.update_connection(
                account,
                &connection.other_user(&domain),
                ConnectionStatus::Accepted,
            )
            .await?;
        }
        info!(accepted = pending.len(), "Accepted incoming connection requests");
        Ok(pending.len())
    }
}
