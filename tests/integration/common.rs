use std::sync::Once;
use std::time::Duration;

use backdoor::client::{BasicAuth, RetryConfig};
use backdoor::{BackdoorHttpClient, BackendClient, BackendProfile, ClientConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOMAIN: &str = "staging.test";
pub const ALICE_ID: &str = "00000000-0000-0000-0000-00000000a11c";

static TRACING: Once = Once::new();

/// Route client logs to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A backend client for `server` with backdoor credentials and fast retries.
pub fn backend(server: &MockServer) -> BackendClient {
    init_tracing();
    let profile = BackendProfile::new("staging", &server.uri())
        .expect("mock server uri is a valid base url")
        .with_domain(DOMAIN)
        .with_basic_auth(BasicAuth::new("backdoor", "letmein"));
    let config = ClientConfig::builder()
        .with_retry(
            RetryConfig::default()
                .with_max_attempts(3)
                .with_initial_delay(Duration::from_millis(5)),
        )
        .build();
    BackendClient::new(BackdoorHttpClient::new(profile, config).expect("client builds"))
}

pub fn token_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": 900,
        "user": ALICE_ID
    })
}

/// `/login` answers with `token` and a session cookie.
pub async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "zuid=session-cookie; Path=/access; HttpOnly")
                .set_body_json(token_body(token)),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}
