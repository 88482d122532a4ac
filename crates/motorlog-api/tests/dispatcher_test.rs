#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` request dispatch using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use motorlog_api::session::TOKEN_KEY;
use motorlog_api::{
    ApiClient, ApiErrorEvent, ApiRequest, BridgeEvent, EntityId, Error, EventBridge,
    KeyValueStore, MemoryStore, Session, Topic, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    client: ApiClient,
    store: Arc<MemoryStore>,
    events: Arc<Mutex<Vec<ApiErrorEvent>>>,
}

async fn setup() -> Harness {
    setup_with(TransportConfig::default()).await
}

async fn setup_with(transport: TransportConfig) -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(Session::new(store.clone()));
    let bridge = Arc::new(EventBridge::new());

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bridge.on(Topic::ApiError, move |event| {
        let BridgeEvent::ApiError(e) = event;
        sink.lock().unwrap().push(e.clone());
    });

    let base_url = Url::parse(&format!("{}/api/v1", server.uri())).unwrap();
    let client = ApiClient::new(
        base_url,
        &SecretString::from("app-key".to_string()),
        &transport,
        session,
        bridge,
    )
    .unwrap();

    Harness {
        server,
        client,
        store,
        events,
    }
}

fn api(suffix: &str) -> String {
    format!("/api/v1{suffix}")
}

fn vehicles_body() -> Value {
    json!({
        "data": [{ "id": 1, "brand": "Toyota", "model": "Corolla", "year": 2018 }],
        "success": true
    })
}

// ── Headers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_static_headers_and_bearer() {
    let h = setup().await;
    h.client
        .session()
        .set_token(SecretString::from("tok-1".to_string()))
        .unwrap();

    Mock::given(method("GET"))
        .and(path(api("/vehicles")))
        .and(header("X-API-Key", "app-key"))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let resp = h.client.list_vehicles().await.unwrap();
    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.data[0].brand, "Toyota");
    assert!(!resp.short_circuited);
}

#[tokio::test]
async fn test_login_then_authorized_request() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path(api("/auth/login")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "fresh-token", "user": { "id": 5, "name": "Ana", "email": "ana@example.com" } },
            "success": true
        })))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path(api("/vehicles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .mount(&h.server)
        .await;

    // A stale token is present before login; it must not leak onto /auth/login.
    h.client
        .session()
        .set_token(SecretString::from("stale".to_string()))
        .unwrap();

    let user = h
        .client
        .login("ana@example.com", &SecretString::from("pw".to_string()))
        .await
        .unwrap();
    assert_eq!(user.name, "Ana");
    assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh-token"));

    h.client.list_vehicles().await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.path().ends_with("/auth/login"));
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(
        requests[1].headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer fresh-token"
    );
}

// ── Failure classification ──────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let h = setup().await;
    h.client
        .session()
        .set_token(SecretString::from("expired".to_string()))
        .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthenticated." })))
        .mount(&h.server)
        .await;

    let err = h.client.get_user().await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired), "got: {err:?}");
    assert!(err.to_string().contains("re-authentication required"));
    assert!(h.client.session().token().is_none());
    assert!(h.store.get(TOKEN_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_validation_errors_are_flattened() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path(api("/auth/register")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {
                "email": ["is required"],
                "password": ["too short", "needs digit"]
            }
        })))
        .mount(&h.server)
        .await;

    let registration = motorlog_api::Registration {
        name: "Ana".into(),
        email: String::new(),
        password: "abc".into(),
        password_confirmation: "abc".into(),
    };
    let err = h.client.register(&registration).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "email: is required\npassword: too short, needs digit"
    );
    let fields = err.field_errors().unwrap();
    assert_eq!(fields["password"], vec!["too short", "needs digit"]);
}

#[tokio::test]
async fn test_non_json_response_carries_snippet() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path(api("/vehicles")))
        .respond_with(
            ResponseTemplate::new(502).set_body_raw("<html>Bad Gateway</html>", "text/html"),
        )
        .mount(&h.server)
        .await;

    match h.client.list_vehicles().await {
        Err(Error::UnexpectedContentType {
            status,
            content_type,
            snippet,
        }) => {
            assert_eq!(status, 502);
            assert_eq!(content_type, "text/html");
            assert!(snippet.contains("Bad Gateway"));
        }
        other => panic!("expected UnexpectedContentType, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_message_and_generic_fallback() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path(api("/vehicles/1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Vehicle not found" })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/vehicles/2")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&h.server)
        .await;

    let err = h.client.get_vehicle(&EntityId::from(1_u64)).await.unwrap_err();
    assert_eq!(err.to_string(), "Vehicle not found");
    assert_eq!(err.status(), Some(404));

    let err = h.client.get_vehicle(&EntityId::from(2_u64)).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 500");
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let h = setup_with(TransportConfig::default().with_timeout(Duration::from_millis(200))).await;

    Mock::given(method("GET"))
        .and(path(api("/vehicles")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vehicles_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&h.server)
        .await;

    let err = h.client.list_vehicles().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert!(err.is_transient());
    assert_eq!(h.events.lock().unwrap().len(), 1);
}

// ── Error events ────────────────────────────────────────────────────

#[tokio::test]
async fn test_exactly_one_event_per_failure() {
    let h = setup().await;

    Mock::given(method("DELETE"))
        .and(path(api("/reminders/9")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&h.server)
        .await;

    let _ = h.client.delete_reminder(&EntityId::from(9_u64)).await.unwrap_err();

    let events = h.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].url.ends_with("/api/v1/reminders/9"), "url: {}", events[0].url);
    assert_eq!(events[0].method, "DELETE");
    assert_eq!(events[0].message, "boom");
}

#[tokio::test]
async fn test_success_emits_nothing() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path(api("/expense-types")))
        .and(query_param("lang", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "name": "Kraftstoff" }]
        })))
        .mount(&h.server)
        .await;

    let resp = h
        .client
        .get_dictionary(motorlog_api::DictionaryResource::ExpenseTypes, "de")
        .await
        .unwrap();
    assert_eq!(resp.data[0].name, "Kraftstoff");
    assert!(h.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_decode_failure_is_an_error_event() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path(api("/vehicles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "not a list" })))
        .mount(&h.server)
        .await;

    let err = h.client.list_vehicles().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
    assert_eq!(h.events.lock().unwrap().len(), 1);
}

// ── Guest mode ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_guest_mode_short_circuits_protected_routes() {
    let h = setup().await;
    h.client.session().set_guest_mode(true).unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .expect(0)
        .mount(&h.server)
        .await;

    let vehicles = h.client.list_vehicles().await.unwrap();
    assert!(vehicles.data.is_empty());
    assert!(vehicles.success);
    assert!(vehicles.short_circuited);

    let user = h.client.get_user().await.unwrap();
    assert_eq!(user.data, motorlog_api::User::default());

    let raw = h
        .client
        .send(ApiRequest::get("/service-history/4"))
        .await
        .unwrap();
    assert_eq!(raw.body, json!({ "data": {}, "success": true }));

    assert!(h.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_guest_mode_leaves_public_routes_alone() {
    let h = setup().await;
    h.client.session().set_guest_mode(true).unwrap();

    Mock::given(method("GET"))
        .and(path(api("/user-settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "theme": "dark" } })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/reminder-types")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&h.server)
        .await;

    let reply = h.client.send(ApiRequest::get("/user-settings")).await.unwrap();
    assert!(!reply.short_circuited);
    assert_eq!(reply.body["data"]["theme"], "dark");

    let types = h
        .client
        .get_dictionary(motorlog_api::DictionaryResource::ReminderTypes, "en")
        .await
        .unwrap();
    assert!(!types.short_circuited);
}

#[tokio::test]
async fn test_logout_removes_token_even_if_server_fails() {
    let h = setup().await;
    h.client
        .session()
        .set_token(SecretString::from("tok".to_string()))
        .unwrap();

    Mock::given(method("POST"))
        .and(path(api("/auth/logout")))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })))
        .mount(&h.server)
        .await;

    h.client.logout().await.unwrap();
    assert!(!h.client.session().is_authenticated());
    assert!(h.store.get(TOKEN_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_missing_token_in_login_response() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path(api("/auth/login")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "user": {} } })))
        .mount(&h.server)
        .await;

    let err = h
        .client
        .login("a@b.c", &SecretString::from("pw".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(h.client.session().token().is_none());
}
