//! Asset upload and download round trip through a mock store.

use std::sync::{Arc, Mutex};

use backdoor::api::{AssetMetadata, Retention};
use backdoor::UserAccount;
use base64::Engine;
use bytes::Bytes;
use md5::{Digest, Md5};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::{backend, mount_login};

const KEY: &str = "3-4-7f0c3b1e";

/// Content of the part following the JSON metadata part.
fn uploaded_content(body: &[u8]) -> Vec<u8> {
    let marker = b"Content-MD5: ";
    let start = body
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("body carries a Content-MD5 header");
    let rest = &body[start..];
    let content_start = rest
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("headers end")
        + 4;
    let content = &rest[content_start..];
    let end = content.len() - b"\r\n--frontier--\r\n".len();
    content[..end].to_vec()
}

#[tokio::test]
async fn test_uploaded_asset_downloads_unchanged() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    let content: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
    let expected_md5 = base64::engine::general_purpose::STANDARD.encode(Md5::digest(&content));
    let stored: Arc<Mutex<Option<Vec<u8>>>> = Arc::default();

    let upload_store = Arc::clone(&stored);
    let md5_line = format!("Content-MD5: {expected_md5}\r\n");
    Mock::given(method("POST"))
        .and(path("/assets/v3"))
        .and(header("Content-Type", "multipart/mixed; boundary=frontier"))
        .respond_with(move |request: &Request| {
            let body = String::from_utf8_lossy(&request.body);
            if !body.contains(&md5_line) || !body.contains("\"retention\":\"expiring\"") {
                return ResponseTemplate::new(400);
            }
            *upload_store.lock().unwrap() = Some(uploaded_content(&request.body));
            ResponseTemplate::new(201).set_body_json(json!({
                "key": KEY,
                "token": "asset-token",
                "expires": "2026-12-31T00:00:00Z"
            }))
        })
        .expect(1)
        .mount(&server)
        .await;

    let download_store = Arc::clone(&stored);
    Mock::given(method("GET"))
        .and(path(format!("/assets/v3/{KEY}")))
        .and(header("Authorization", "Bearer token"))
        .respond_with(move |_: &Request| match download_store.lock().unwrap().clone() {
            Some(content) => {
                ResponseTemplate::new(200).set_body_raw(content, "application/octet-stream")
            }
            None => ResponseTemplate::new(404),
        })
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let alice = UserAccount::new("alice@example.com", "pw");

    let key = backend
        .upload_asset(
            &alice,
            Bytes::from(content.clone()),
            &AssetMetadata::new(false, Retention::Expiring),
        )
        .await
        .unwrap();
    assert_eq!(key.key, KEY);
    assert_eq!(key.token.as_deref(), Some("asset-token"));

    let downloaded = backend.download_asset(&alice, &key.key).await.unwrap();
    assert_eq!(downloaded.as_ref(), content.as_slice());
}

#[tokio::test]
async fn test_failed_upload_is_not_repeated() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    Mock::given(method("POST"))
        .and(path("/assets/v3"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let alice = UserAccount::new("alice@example.com", "pw");

    let err = backend
        .upload_asset(&alice, "hello", &AssetMetadata::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
}
