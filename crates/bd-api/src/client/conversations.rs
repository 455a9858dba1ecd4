use std::collections::HashMap;

use backdoor_auth::UserAccount;
use backdoor_client::{walk_batches, walk_pages, IntoPage, Page, RequestBuilder};
use tracing::{debug, instrument, warn};

use crate::conversations::{
    Conversation, ConversationIdsPage, ConversationsFound, ListConversationsRequest,
    ListIdsRequest, NewGroup, CONVERSATION_LIST_BATCH,
};
use crate::error::{Error, Result};
use crate::types::QualifiedId;

impl super::BackendClient {
    /// Ids of every conversation `account` is a member of.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn list_conversation_ids(&self, account: &UserAccount) -> Result<Vec<QualifiedId>> {
        walk_pages(|cursor| async move { self.conversation_ids_page(account, cursor).await })
            .await
    }

    async fn conversation_ids_page(
        &self,
        account: &UserAccount,
        cursor: Option<String>,
    ) -> Result<Page<QualifiedId>> {
        let body = serde_json::to_value(ListIdsRequest {
            paging_state: cursor.as_deref(),
        })?;
        let page: ConversationIdsPage = self
            .authed_json(account, || {
                RequestBuilder::post("conversations/list-ids").json_value(body.clone())
            })
            .await?;
        Ok(page.into_page()?)
    }

    /// Every conversation of `account`, fetched in batches of ids.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn list_conversations(&self, account: &UserAccount) -> Result<Vec<Conversation>> {
        let ids = self.list_conversation_ids(account).await?;
        self.conversations_by_id(account, &ids).await
    }

    /// Look up conversations by id, preserving the order of `ids`.
    pub async fn conversations_by_id(
        &self,
        account: &UserAccount,
        ids: &[QualifiedId],
    ) -> Result<Vec<Conversation>> {
        walk_batches(ids, CONVERSATION_LIST_BATCH, |batch| async move {
            self.conversation_batch(account, batch).await
        })
        .await
    }

    async fn conversation_batch(
        &self,
        account: &UserAccount,
        qualified_ids: Vec<QualifiedId>,
    ) -> Result<Vec<Conversation>> {
        let body = serde_json::to_value(ListConversationsRequest {
            qualified_ids: &qualified_ids,
        })?;
        let response: ConversationsFound = self
            .authed_json(account, || {
                RequestBuilder::post("v4/conversations/list").json_value(body.clone())
            })
            .await?;

        if !response.failed.is_empty() {
            warn!(failed = response.failed.len(), "Some conversations could not be fetched");
        }
        if !response.not_found.is_empty() {
            debug!(not_found = response.not_found.len(), "Some conversations were not found");
        }
        let mut found: HashMap<QualifiedId, Conversation> = response
            .found
            .into_iter()
            .map(|conversation| (conversation.qualified_id.clone(), conversation))
            .collect();
        Ok(qualified_ids
            .iter()
            .filter_map(|id| found.remove(id))
            .collect())
    }

    /// The first conversation named `name`.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn conversation_by_name(
        &self,
        account: &UserAccount,
        name: &str,
    ) -> Result<Conversation> {
        self.list_conversations(account)
            .await?
            .into_iter()
            .find(|c| c.name.as_deref() == Some(name))
            .ok_or_else(|| Error::not_found(format!("conversation named {name:?}")))
    }

    /// Create a group conversation owned by `account`.
    #[instrument(skip(self, account, group), fields(email = %account.email, name = %group.name))]
    pub async fn create_group(&self, account: &UserAccount, group: &NewGroup) -> Result<Conversation> {
        let body = serde_json::to_value(group)?;
        let outcome = self
            .authed_once(account, || {
                RequestBuilder::post("conversations")
                    .json_value(body.clone())
                    .acceptable([201])
            })
            .await?;
        Ok(outcome.json()?)
    }
}
