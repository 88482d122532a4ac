// Request dispatcher
//
// Wraps `reqwest::Client` with base-URL joining, bearer injection, the
// guest-mode gate, a per-request deadline and response classification.
// Endpoint methods (vehicles, reminders, etc.) live in sibling modules as
// inherent methods so this file stays focused on transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, FieldErrors};
use crate::events::{ApiErrorEvent, BridgeEvent, EventBridge};
use crate::models::ApiResponse;
use crate::routes::{self, GateDecision};
use crate::session::Session;
use crate::transport::TransportConfig;

/// Longest body excerpt carried by diagnostics.
const SNIPPET_LEN: usize = 200;

// ── Request ──────────────────────────────────────────────────────────

/// One backend call: method, path relative to the base URL, query,
/// optional JSON body and extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, Error> {
        self.body = Some(encode_body(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: &'static str, value: reqwest::header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ── Reply ────────────────────────────────────────────────────────────

/// A successful response body, before it is decoded into an envelope.
#[derive(Debug, Clone)]
pub struct Reply {
    pub body: Value,
    /// `true` when the guest-mode gate answered locally.
    pub short_circuited: bool,
}

impl Reply {
    /// Decode the `{ data, success, ... }` envelope.
    pub fn decode<T: DeserializeOwned + Default>(self) -> Result<ApiResponse<T>, Error> {
        let raw = self.body;
        let mut envelope: ApiResponse<T> =
            serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: raw.to_string(),
            })?;
        envelope.short_circuited = self.short_circuited;
        Ok(envelope)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the motorlog REST backend.
///
/// Shares its [`Session`] (token + guest flag) and [`EventBridge`] with the
/// rest of the application; every failed request is published on the
/// bridge as an `API_ERROR` before the error is returned.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
    events: Arc<EventBridge>,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client for `base_url` (e.g. `https://api.motorlog.app/api/v1`).
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
        session: Arc<Session>,
        events: Arc<EventBridge>,
    ) -> Result<Self, Error> {
        let http = transport.build_client(api_key)?;
        Ok(Self::with_client(http, base_url, transport.timeout, session, events))
    }

    /// Wrap an existing `reqwest::Client` (caller manages default headers).
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        timeout: Duration,
        session: Arc<Session>,
        events: Arc<EventBridge>,
    ) -> Self {
        Self {
            http,
            base_url,
            session,
            events,
            timeout,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn events(&self) -> &Arc<EventBridge> {
        &self.events
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}{path}` with exactly one slash between them.
    fn url_string(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send a request and return the raw JSON body.
    pub async fn send(&self, request: ApiRequest) -> Result<Reply, Error> {
        let result = self.perform(&request).await;
        self.observe(&request, result)
    }

    /// Send a request and decode the `{ data, ... }` envelope.
    pub async fn execute<T: DeserializeOwned + Default>(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse<T>, Error> {
        let result = match self.perform(&request).await {
            Ok(reply) => reply.decode(),
            Err(e) => Err(e),
        };
        self.observe(&request, result)
    }

    pub(crate) async fn get<T: DeserializeOwned + Default>(
        &self,
        path: impl Into<String>,
    ) -> Result<ApiResponse<T>, Error> {
        self.execute(ApiRequest::get(path)).await
    }

    pub(crate) async fn post<T: DeserializeOwned + Default>(
        &self,
        path: impl Into<String>,
        body: &(impl Serialize + Sync),
    ) -> Result<ApiResponse<T>, Error> {
        self.execute_with_body(ApiRequest::post(path), body).await
    }

    pub(crate) async fn put<T: DeserializeOwned + Default>(
        &self,
        path: impl Into<String>,
        body: &(impl Serialize + Sync),
    ) -> Result<ApiResponse<T>, Error> {
        self.execute_with_body(ApiRequest::put(path), body).await
    }

    /// Encoding failures are reported like any other failed request.
    async fn execute_with_body<T: DeserializeOwned + Default>(
        &self,
        mut request: ApiRequest,
        body: &(impl Serialize + Sync),
    ) -> Result<ApiResponse<T>, Error> {
        match encode_body(body) {
            Ok(value) => {
                request.body = Some(value);
                self.execute(request).await
            }
            Err(e) => self.observe(&request, Err(e)),
        }
    }

    pub(crate) async fn delete(&self, path: impl Into<String>) -> Result<ApiResponse<Value>, Error> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Publish failures on the event bridge, exactly once per request.
    fn observe<T>(&self, request: &ApiRequest, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(ref err) = result {
            let url = self.url_string(&request.path);
            warn!(method = %request.method, %url, error = %err, "request failed");
            self.events.emit(&BridgeEvent::ApiError(ApiErrorEvent {
                url,
                method: request.method.to_string(),
                message: err.to_string(),
            }));
        }
        result
    }

    /// Gate check, then one network round trip.
    async fn perform(&self, request: &ApiRequest) -> Result<Reply, Error> {
        if let GateDecision::ShortCircuit(shape) =
            routes::evaluate(self.session.is_guest(), &request.method, &request.path)
        {
            debug!(method = %request.method, path = %request.path, "guest mode: short-circuited");
            return Ok(Reply {
                body: GateDecision::empty_envelope(shape),
                short_circuited: true,
            });
        }

        let body = self.round_trip(request).await?;
        Ok(Reply {
            body,
            short_circuited: false,
        })
    }

    async fn round_trip(&self, request: &ApiRequest) -> Result<Value, Error> {
        let url = Url::parse(&self.url_string(&request.path))?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if routes::sends_bearer(&request.path) {
            if let Some(token) = self.session.token() {
                builder = builder.bearer_auth(token.expose_secret());
            }
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            let body = resp.text().await?;
            Ok::<_, Error>((status, content_type, body))
        };

        let timeout_secs = self.timeout.as_secs();
        let (status, content_type, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout { timeout_secs })?
            .map_err(|e| match e {
                Error::Transport(ref t) if t.is_timeout() => Error::Timeout { timeout_secs },
                other => other,
            })?;

        trace!(%status, %content_type, len = body.len(), "response received");
        self.classify(status, &content_type, body)
    }

    // ── Response handling ────────────────────────────────────────────

    fn classify(&self, status: StatusCode, content_type: &str, body: String) -> Result<Value, Error> {
        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.session.remove_token() {
                warn!(error = %e, "failed to clear token after 401");
            }
            return Err(Error::SessionExpired);
        }

        if status == StatusCode::NO_CONTENT && body.trim().is_empty() {
            return Ok(serde_json::json!({ "success": true }));
        }

        if !is_json(content_type) {
            return Err(Error::UnexpectedContentType {
                status: status.as_u16(),
                content_type: content_type.to_owned(),
                snippet: snippet(&body),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", snippet(&body)),
            body: body.clone(),
        })?;

        if status.is_success() {
            return Ok(value);
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            if let Some(errors) = field_errors(&value) {
                return Err(Error::Validation { errors });
            }
        }

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(
                || format!("Request failed with status {}", status.as_u16()),
                str::to_owned,
            );
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn encode_body(body: &impl Serialize) -> Result<Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Deserialization {
        message: format!("failed to encode request body: {e}"),
        body: String::new(),
    })
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}

/// Pull a non-empty `errors` map out of a 422 body. Single-string values
/// are accepted as one-message lists.
fn field_errors(body: &Value) -> Option<FieldErrors> {
    let map = body.get("errors")?.as_object()?;
    let errors: FieldErrors = map
        .iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::Array(items) => items
                    .iter()
                    .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_owned))
                    .collect(),
                Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            (field.clone(), messages)
        })
        .collect();
    (!errors.is_empty()).then_some(errors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_content_types() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/html"));
        assert!(!is_json(""));
    }

    #[test]
    fn snippet_is_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(snippet(&body).len(), SNIPPET_LEN);
    }

    #[test]
    fn field_errors_keep_insertion_order() {
        let body: Value = serde_json::from_str(
            r#"{"errors":{"vin":["is invalid"],"brand":"is required"}}"#,
        )
        .unwrap_or_default();
        let errors = field_errors(&body).unwrap_or_default();
        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(fields, ["vin", "brand"]);
        assert_eq!(errors["brand"], vec!["is required".to_owned()]);
    }

    #[tokio::test]
    async fn unencodable_body_is_reported_on_the_bridge() {
        use std::collections::BTreeMap;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use crate::events::Topic;
        use crate::storage::MemoryStore;

        let events = Arc::new(EventBridge::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        events.on(Topic::ApiError, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api/v1").unwrap(),
            Duration::from_secs(1),
            Arc::new(Session::new(Arc::new(MemoryStore::new()))),
            Arc::clone(&events),
        );

        // Tuple keys cannot become JSON object keys.
        let body: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);
        let err = client.post::<Value>("/vehicles", &body).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_errors_map_is_ignored() {
        assert!(field_errors(&json!({ "errors": {} })).is_none());
        assert!(field_errors(&json!({ "message": "nope" })).is_none());
    }
}
