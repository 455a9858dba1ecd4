use std::time::Duration;

use backdoor_auth::UserAccount;
use backdoor_client::{RequestBuilder, RetryPolicy};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Error, ErrorKind, Result};
use crate::features::{FeatureConfig, FeatureConfigs, FeatureStatus, LockStatus};

fn team_feature_path(team: Uuid, name: &str) -> String {
    format!("i/teams/{team}/features/{}", urlencoding::encode(name))
}

impl super::BackendClient {
    /// Every feature flag as seen by `account`.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn feature_configs(&self, account: &UserAccount) -> Result<FeatureConfigs> {
        self.authed_json(account, || RequestBuilder::get("feature-configs"))
            .await
    }

    /// One feature flag as seen by `account`.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn feature_config(&self, account: &UserAccount, name: &str) -> Result<FeatureConfig> {
        let target = format!("feature-configs/{}", urlencoding::encode(name));
        self.authed_json(account, || RequestBuilder::get(target.as_str()))
            .await
    }

    /// A team's feature flag (backdoor).
    #[instrument(skip(self))]
    pub async fn team_feature(&self, team: Uuid, name: &str) -> Result<FeatureConfig> {
        let target = team_feature_path(team, name);
        let outcome = self
            .backdoor(|| RequestBuilder::get(target.as_str()))
            .await?;
        Ok(outcome.json()?)
    }

    /// Set a team's feature flag (backdoor).
    #[instrument(skip(self, config), fields(status = %config.status))]
    pub async fn set_team_feature(
        &self,
        team: Uuid,
        name: &str,
        config: &FeatureConfig,
    ) -> Result<()> {
        let target = team_feature_path(team, name);
        let body = serde_json::to_value(config)?;
        self.backdoor(|| RequestBuilder::put(target.as_str()).json_value(body.clone()))
            .await?;
        info!("Team feature updated");
        Ok(())
    }

    /// Lock or unlock a team's feature flag (backdoor).
    #[instrument(skip(self))]
    pub async fn set_team_feature_lock(
        &self,
        team: Uuid,
        name: &str,
        lock: LockStatus,
    ) -> Result<()> {
        let target = format!("{}/{}", team_feature_path(team, name), lock.as_str());
        self.backdoor(|| RequestBuilder::put(target.as_str()).json_value(json!({})))
            .await?;
        Ok(())
    }

    /// Poll the flag as seen by `account` until it reports `expected`.
    ///
    /// Polls every `interval × attempt` until `timeout` has elapsed; on
    /// timeout the last observed mismatch (or request error) is returned.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn wait_for_feature_status(
        &self,
        account: &UserAccount,
        name: &str,
        expected: FeatureStatus,
        timeout: Duration,
        interval: Duration,
    ) -> Result<FeatureConfig> {
        let target = format!("feature-configs/{}", urlencoding::encode(name));
        let target = target.as_str();
        let once = RetryPolicy::none();
        let once = &once;

        RetryPolicy::deadline(timeout, interval)
            .run(|| async move {
                let config: FeatureConfig = self
                    .authed_with(once, account, || RequestBuilder::get(target))
                    .await?
                    .json()?;
                if config.status == expected {
                    Ok(config)
                } else {
                    Err(Error::new(ErrorKind::Unconverged {
                        name: name.to_string(),
                        expected: expected.to_string(),
                        actual: config.status.to_string(),
                    }))
                }
            })
            .await
    }
}
