use backdoor_auth::UserAccount;
use backdoor_client::RequestBuilder;
use tracing::{info, instrument};

use crate::devices::{Device, RemoveDevice};
use crate::error::Result;

impl super::BackendClient {
    /// Devices registered for `account`.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn devices(&self, account: &UserAccount) -> Result<Vec<Device>> {
        self.authed_json(account, || RequestBuilder::get("clients"))
            .await
    }

    /// Remove one device; the account password confirms the removal.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn remove_device(&self, account: &UserAccount, device_id: &str) -> Result<()> {
        let target = format!("clients/{}", urlencoding::encode(device_id));
        let body = serde_json::to_value(RemoveDevice {
            password: account.password(),
        })?;
        self.authed(account, || {
            RequestBuilder::delete(target.as_str())
                .json_value(body.clone())
                .acceptable([200, 204])
        })
        .await?;
        Ok(())
    }

    /// Remove every device of `account`. Returns how many were removed.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn remove_all_devices(&self, account: &UserAccount) -> Result<usize> {
        let devices = self.devices(account).await?;
        for device in &devices {
            self.remove_device(account, &device.id).await?;
        }
        info!(removed = devices.len(), "Removed devices");
        Ok(devices.len())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::testing::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_remove_all_devices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "d1", "type": "permanent", "class": "phone"},
                {"id": "d2", "type": "temporary"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/clients/d1"))
            .and(body_json(json!({"password": "pw"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/clients/d2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = backend_for(&mock_server);
        let account = logged_in(&backend, "a@b.c").await;
        assert_eq!(backend.remove_all_devices(&account).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remove_device_rejects_unexpected_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/clients/d1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"label": "invalid-credentials"})))
            .mount(&mock_server)
            .await;

        let backend = backend_for(&mock_server);
        let account = logged_in(&backend, "a@b.c").await;
        let err = backend.remove_device(&account, "d1").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
