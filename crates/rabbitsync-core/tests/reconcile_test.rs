#![allow(clippy::unwrap_used)]
// Integration tests for the resource reconcilers against a mock broker.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rabbitsync_api::ManagementClient;
use rabbitsync_core::{
    ExchangeConfig, ExchangeReconciler, ExchangeRecord, PermissionConfig, PermissionReconciler,
    Reconcile, ReconcileError, TopicPermissionReconciler, TopicPermissionRecord, UserConfig,
    UserReconciler, UserRecord, VhostConfig, VhostReconciler, VhostRecord,
};

const STORED_HASH: &str = "kI3GCqW5JLMJa4iX1lo7X4D6XbYqlLgxIs30+P6tENUV2POR";
const SHA256_ALGORITHM: &str = "rabbit_password_hashing_sha256";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ManagementClient) {
    let server = MockServer::start().await;
    let client = ManagementClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        "guest",
        "guest".to_string().into(),
    )
    .unwrap();
    (server, client)
}

fn user_config(version: &str) -> UserConfig {
    UserConfig {
        name: "svc".into(),
        password: SecretString::from("test12".to_owned()),
        password_version: version.to_owned(),
        tags: Some(vec!["monitoring".into()]),
    }
}

fn user_record(version: &str) -> UserRecord {
    UserRecord {
        id: "svc".into(),
        name: "svc".into(),
        tags: vec!["monitoring".into()],
        password_version: version.to_owned(),
    }
}

async fn mount_broker_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users/svc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "svc",
            "tags": ["monitoring"],
            "password_hash": STORED_HASH,
            "hashing_algorithm": SHA256_ALGORITHM
        })))
        .mount(server)
        .await;
}

// ── User: secret rotation ───────────────────────────────────────────

#[tokio::test]
async fn test_user_update_without_rotation_resubmits_stored_hash() {
    let (server, client) = setup().await;
    mount_broker_user(&server).await;

    // Marker unchanged: the outgoing payload must carry the broker's
    // hash byte-for-byte and no plaintext password field.
    Mock::given(method("PUT"))
        .and(path("/api/users/svc"))
        .and(body_partial_json(json!({
            "password_hash": STORED_HASH,
            "hashing_algorithm": SHA256_ALGORITHM
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = UserReconciler::new(&client);
    let record = reconciler
        .update(&user_config("v1"), &user_record("v1"))
        .await
        .unwrap();
    assert_eq!(record.password_version, "v1");

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert!(body.get("password").is_none(), "plaintext must not be sent");
}

#[tokio::test]
async fn test_user_update_with_rotation_sends_fresh_hash() {
    let (server, client) = setup().await;
    mount_broker_user(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/users/svc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = UserReconciler::new(&client);
    let record = reconciler
        .update(&user_config("v2"), &user_record("v1"))
        .await
        .unwrap();
    assert_eq!(record.password_version, "v2");

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    // Fresh salt, so the hash cannot equal the stored one even for the
    // same plaintext.
    assert_ne!(body["password_hash"].as_str().unwrap(), STORED_HASH);
    assert_eq!(body["hashing_algorithm"], SHA256_ALGORITHM);
    assert!(body.get("password").is_none(), "plaintext must not be sent");
}

#[tokio::test]
async fn test_user_create_sends_plaintext_once() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/svc"))
        .and(body_partial_json(json!({
            "password": "test12",
            "tags": "monitoring"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = UserReconciler::new(&client);
    let record = reconciler.create(&user_config("v1")).await.unwrap();
    assert_eq!(record.id, "svc");
    assert_eq!(record.password_version, "v1");
}

// ── Read absence ────────────────────────────────────────────────────

#[tokio::test]
async fn test_user_read_404_reports_absence() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/svc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let reconciler = UserReconciler::new(&client);
    let outcome = reconciler.read(&user_record("v1")).await.unwrap();
    assert!(outcome.is_absent());
}

#[tokio::test]
async fn test_user_read_500_is_an_error_not_absence() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/svc"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let reconciler = UserReconciler::new(&client);
    let result = reconciler.read(&user_record("v1")).await;
    assert!(matches!(
        result,
        Err(ReconcileError::RemoteRejected { status: 500, .. })
    ));
}

// ── Delete idempotency ──────────────────────────────────────────────

#[tokio::test]
async fn test_user_delete_twice_succeeds() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/svc"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/svc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let reconciler = UserReconciler::new(&client);
    let record = user_record("v1");
    reconciler.delete(&record).await.unwrap();
    reconciler.delete(&record).await.unwrap();
}

// ── Topic permissions: collection-scoped read ───────────────────────

fn topic_record(exchange: &str) -> TopicPermissionRecord {
    TopicPermissionRecord {
        id: format!("svc@staging@{exchange}"),
        user: "svc".into(),
        vhost: "staging".into(),
        exchange: exchange.to_owned(),
        write: String::new(),
        read: String::new(),
    }
}

async fn mount_topic_grants(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/topic-permissions/staging/svc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "user": "svc", "vhost": "staging", "exchange": "a", "write": ".*", "read": ".*" },
            { "user": "svc", "vhost": "staging", "exchange": "b", "write": "^b", "read": "^b" }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_topic_permission_read_filters_by_exchange() {
    let (server, client) = setup().await;
    mount_topic_grants(&server).await;

    let reconciler = TopicPermissionReconciler::new(&client);
    let outcome = reconciler.read(&topic_record("b")).await.unwrap();
    let record = outcome.found().unwrap();
    assert_eq!(record.exchange, "b");
    assert_eq!(record.write, "^b");
    assert_eq!(record.read, "^b");
}

#[tokio::test]
async fn test_topic_permission_read_missing_exchange_is_absence() {
    let (server, client) = setup().await;
    mount_topic_grants(&server).await;

    let reconciler = TopicPermissionReconciler::new(&client);
    let outcome = reconciler.read(&topic_record("c")).await.unwrap();
    assert!(outcome.is_absent());
}

// ── Exchange: replace-only semantics ────────────────────────────────

fn exchange_record() -> ExchangeRecord {
    ExchangeRecord {
        id: "events@staging".into(),
        name: "events".into(),
        vhost: "staging".into(),
        exchange_type: "topic".into(),
        durable: true,
        auto_delete: false,
        arguments: std::collections::BTreeMap::new(),
    }
}

fn exchange_config() -> ExchangeConfig {
    ExchangeConfig {
        name: "events".into(),
        vhost: Some("staging".into()),
        exchange_type: "topic".into(),
        durable: Some(true),
        auto_delete: Some(false),
        arguments: None,
    }
}

#[test]
fn test_exchange_any_delta_requires_replace() {
    let observed = exchange_record();

    assert!(!ExchangeReconciler::requires_replace(
        &exchange_config(),
        &observed
    ));

    let mut retyped = exchange_config();
    retyped.exchange_type = "fanout".into();
    assert!(ExchangeReconciler::requires_replace(&retyped, &observed));

    let mut undurable = exchange_config();
    undurable.durable = Some(false);
    assert!(ExchangeReconciler::requires_replace(&undurable, &observed));

    let mut with_args = exchange_config();
    with_args.arguments = Some(
        [("alternate-exchange".to_owned(), "fallback".to_owned())]
            .into_iter()
            .collect(),
    );
    assert!(ExchangeReconciler::requires_replace(&with_args, &observed));
}

#[tokio::test]
async fn test_exchange_read_stringifies_argument_values() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/exchanges/staging/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "events",
            "vhost": "staging",
            "type": "topic",
            "durable": true,
            "auto_delete": false,
            "arguments": { "alternate-exchange": "fallback", "x-max-length": 100 }
        })))
        .mount(&server)
        .await;

    let reconciler = ExchangeReconciler::new(&client);
    let outcome = reconciler.read(&exchange_record()).await.unwrap();
    let record = outcome.found().unwrap();
    assert_eq!(record.arguments["alternate-exchange"], "fallback");
    assert_eq!(record.arguments["x-max-length"], "100");
}

// ── End-to-end: vhost, permission grant, import ─────────────────────

#[tokio::test]
async fn test_provision_vhost_then_grant_then_import() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/vhosts/staging"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/permissions/staging/svc"))
        .and(body_partial_json(json!({
            "configure": ".*", "write": ".*", "read": ".*"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let vhosts = VhostReconciler::new(&client);
    let vhost = vhosts
        .create(&VhostConfig {
            name: "staging".into(),
            ..VhostConfig::default()
        })
        .await
        .unwrap();
    assert_eq!(vhost.id, "staging");
    assert_eq!(vhost.description, "");
    assert!(!vhost.tracing);

    let permissions = PermissionReconciler::new(&client);
    let grant = permissions
        .create(&PermissionConfig {
            user: "svc".into(),
            vhost: Some("staging".into()),
            configure: ".*".into(),
            write: ".*".into(),
            read: ".*".into(),
        })
        .await
        .unwrap();
    assert_eq!(grant.id, "svc@staging");

    // The composite id round-trips through import.
    let imported = PermissionReconciler::import(&grant.id).unwrap();
    assert_eq!(imported.user, "svc");
    assert_eq!(imported.vhost, "staging");
}

#[test]
fn test_permission_import_rejects_malformed_token() {
    let result = PermissionReconciler::import("svc");
    assert!(matches!(
        result,
        Err(ReconcileError::MalformedIdentifier { .. })
    ));
}

#[tokio::test]
async fn test_permission_create_key_with_delimiter_is_rejected_locally() {
    // Validation runs before any broker call, so no server is needed.
    let client = ManagementClient::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        "guest",
        "guest".to_string().into(),
    )
    .unwrap();
    let config = PermissionConfig {
        user: "bad@user".into(),
        vhost: Some("staging".into()),
        configure: ".*".into(),
        write: ".*".into(),
        read: ".*".into(),
    };
    let result = PermissionReconciler::new(&client).create(&config).await;
    assert!(matches!(
        result,
        Err(ReconcileError::ConfigurationInvalid { .. })
    ));
}

// ── Vhost: unset default queue type never drifts ────────────────────

#[tokio::test]
async fn test_vhost_read_ignores_queue_type_when_undeclared() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/vhosts/staging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "staging",
            "description": "",
            "default_queue_type": "classic",
            "tracing": false,
            "tags": []
        })))
        .mount(&server)
        .await;

    let reconciler = VhostReconciler::new(&client);
    let prior = VhostRecord {
        id: "staging".into(),
        name: "staging".into(),
        description: String::new(),
        default_queue_type: None,
        tracing: false,
        tags: Vec::new(),
    };
    let outcome = reconciler.read(&prior).await.unwrap();
    let record = outcome.found().unwrap();
    assert_eq!(record.default_queue_type, None);

    let tracked = VhostRecord {
        default_queue_type: Some("quorum".into()),
        ..prior
    };
    let outcome = reconciler.read(&tracked).await.unwrap();
    let record = outcome.found().unwrap();
    assert_eq!(record.default_queue_type.as_deref(), Some("classic"));
}
