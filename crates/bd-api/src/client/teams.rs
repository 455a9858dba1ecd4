use backdoor_auth::UserAccount;
use backdoor_client::{walk_pages, IntoPage, Page, RequestBuilder};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::teams::{
    Invitation, InvitationsPage, MembersResponse, NewInvitation, Team, TeamMember, TeamRole,
    TeamsResponse, INVITATION_PAGE_SIZE,
};

impl super::BackendClient {
    /// Teams `account` belongs to.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn teams(&self, account: &UserAccount) -> Result<Vec<Team>> {
        let response: TeamsResponse = self
            .authed_json(account, || RequestBuilder::get("teams"))
            .await?;
        Ok(response.teams)
    }

    /// The first team of `account`.
    pub async fn first_team(&self, account: &UserAccount) -> Result<Team> {
        self.teams(account)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("team of {}", account.email)))
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn team_members(&self, account: &UserAccount, team: Uuid) -> Result<Vec<TeamMember>> {
        let target = format!("teams/{team}/members");
        let response: MembersResponse = self
            .authed_json(account, || RequestBuilder::get(target.as_str()))
            .await?;
        Ok(response.members)
    }

    /// Role of `account` in `team`, if it is a member with a known role.
    pub async fn team_role(&self, account: &UserAccount, team: Uuid) -> Result<Option<TeamRole>> {
        let own_id = account
            .id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| Error::protocol(format!("user id of {} is unknown", account.email)))?;
        Ok(self
            .team_members(account, team)
            .await?
            .into_iter()
            .find(|m| m.user == own_id)
            .and_then(|m| m.role()))
    }

    /// Every pending invitation of `team`, walked by last-seen id.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn invitations(&self, account: &UserAccount, team: Uuid) -> Result<Vec<Invitation>> {
        walk_pages(|start| async move { self.invitations_page(account, team, start).await }).await
    }

    async fn invitations_page(
        &self,
        account: &UserAccount,
        team: Uuid,
        start: Option<String>,
    ) -> Result<Page<Invitation>> {
        let target = format!("teams/{team}/invitations");
        let page: InvitationsPage = self
            .authed_json(account, || {
                let request =
                    RequestBuilder::get(target.as_str()).query("size", INVITATION_PAGE_SIZE);
                match &start {
                    Some(start) => request.query("start", start),
                    None => request,
                }
            })
            .await?;
        Ok(page.into_page()?)
    }

    /// Invite `invitation.email` to `team`.
    #[instrument(skip(self, account, invitation), fields(email = %account.email))]
    pub async fn invite(
        &self,
        account: &UserAccount,
        team: Uuid,
        invitation: &NewInvitation,
    ) -> Result<Invitation> {
        let target = format!("teams/{team}/invitations");
        let body = serde_json::to_value(invitation)?;
        let outcome = self
            .authed_once(account, || {
                RequestBuilder::post(target.as_str())
                    .json_value(body.clone())
                    .acceptable([200, 201])
            })
            .await?;
        Ok(outcome.json()?)
    }
}
