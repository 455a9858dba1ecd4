//! Multi-page listings walked through the typed client.

use backdoor::api::{ConnectionStatus, QualifiedId};
use backdoor::UserAccount;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::{backend, mount_login, ALICE_ID, DOMAIN};

fn qid(n: u128) -> QualifiedId {
    QualifiedId::new(Uuid::from_u128(n), DOMAIN)
}

fn connection(to: u128, status: &str) -> serde_json::Value {
    json!({
        "from": ALICE_ID,
        "to": Uuid::from_u128(to),
        "status": status,
        "qualified_to": qid(to)
    })
}

async fn mount_connection_page(
    server: &MockServer,
    cursor: Option<&str>,
    connections: Vec<serde_json::Value>,
    next: &str,
    has_more: bool,
) {
    Mock::given(method("POST"))
        .and(path("/list-connections"))
        .and(body_json(json!({"paging_state": cursor})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connections": connections,
            "paging_state": next,
            "has_more": has_more
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_accept_pending_requests_across_pages() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    mount_connection_page(
        &server,
        None,
        vec![connection(1, "pending"), connection(2, "accepted")],
        "page-2",
        true,
    )
    .await;
    mount_connection_page(
        &server,
        Some("page-2"),
        vec![connection(3, "sent"), connection(4, "pending")],
        "page-3",
        true,
    )
    .await;
    mount_connection_page(
        &server,
        Some("page-3"),
        vec![connection(5, "pending")],
        "page-4",
        false,
    )
    .await;
    for id in [1u128, 4, 5] {
        Mock::given(method("PUT"))
            .and(path(format!("/connections/{DOMAIN}/{}", Uuid::from_u128(id))))
            .and(body_json(json!({"status": "accepted"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let backend = backend(&server);
    let alice = UserAccount::new("alice@example.com", "pw");

    let connections = backend.list_connections(&alice).await.unwrap();
    assert_eq!(connections.len(), 5);
    assert_eq!(
        connections
            .iter()
            .filter(|c| c.status == ConnectionStatus::Pending)
            .count(),
        3
    );

    assert_eq!(backend.accept_all_incoming(&alice).await.unwrap(), 3);
}

#[tokio::test]
async fn test_list_conversations_pages_ids_then_batches_lookups() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    let first: Vec<_> = (0..1200u128).map(qid).collect();
    let second: Vec<_> = (1200..1500u128).map(qid).collect();

    Mock::given(method("POST"))
        .and(path("/conversations/list-ids"))
        .and(body_json(json!({"paging_state": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "qualified_conversations": first,
            "paging_state": "ids-2",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/conversations/list-ids"))
        .and(body_json(json!({"paging_state": "ids-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "qualified_conversations": second,
            "paging_state": "ids-3",
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/conversations/list"))
        .respond_with(|request: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let found: Vec<_> = body["qualified_ids"]
                .as_array()
                .unwrap()
                .iter()
                .map(|id| json!({"qualified_id": id, "name": format!("conv {}", id["id"]), "type": 0}))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({
                "found": found,
                "not_found": [],
                "failed": []
            }))
        })
        .expect(2)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let alice = UserAccount::new("alice@example.com", "pw");

    let conversations = backend.list_conversations(&alice).await.unwrap();
    assert_eq!(conversations.len(), 1500);
    assert_eq!(conversations[0].qualified_id, qid(0));
    assert_eq!(conversations[1499].qualified_id, qid(1499));
    assert!(conversations
        .windows(2)
        .all(|pair| pair[0].qualified_id.id < pair[1].qualified_id.id));
}

#[tokio::test]
async fn test_truncated_listing_is_a_protocol_error() {
    let server = MockServer::start().await;
    mount_login(&server, "token", 1).await;

    Mock::given(method("POST"))
        .and(path("/list-connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connections": [connection(1, "pending")],
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let alice = UserAccount::new("alice@example.com", "pw");

    let err = backend.list_connections(&alice).await.unwrap_err();
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("no cursor"));
}
