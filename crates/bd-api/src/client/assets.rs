use backdoor_auth::UserAccount;
use backdoor_client::{MultipartAsset, RequestBuilder};
use bytes::Bytes;
use tracing::{info, instrument};

use crate::assets::{AssetKey, AssetMetadata};
use crate::error::Result;

impl super::BackendClient {
    /// Upload `content` as a `multipart/mixed` asset.
    #[instrument(skip(self, account, content), fields(email = %account.email))]
    pub async fn upload_asset(
        &self,
        account: &UserAccount,
        content: impl Into<Bytes>,
        metadata: &AssetMetadata,
    ) -> Result<AssetKey> {
        let body = MultipartAsset::new(metadata, content)?.encode()?;
        let size = body.body.len();
        let outcome = self
            .authed_once(account, || {
                RequestBuilder::post("assets/v3")
                    .multipart(body.clone())
                    .acceptable([201])
            })
            .await?;
        let key: AssetKey = outcome.json()?;
        info!(key = %key.key, size, "Asset uploaded");
        Ok(key)
    }

    /// Download an asset's raw bytes.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn download_asset(&self, account: &UserAccount, key: &str) -> Result<Bytes> {
        let target = format!("assets/v3/{}", urlencoding::encode(key));
        let outcome = self
            .authed(account, || RequestBuilder::get(target.as_str()).accept("*/*"))
            .await?;
        Ok(outcome.bytes())
    }
}
