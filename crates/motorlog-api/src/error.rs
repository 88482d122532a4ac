use indexmap::IndexMap;
use thiserror::Error;

/// Per-field validation messages, in the order the backend sent them.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Top-level error type for the `motorlog-api` crate.
///
/// Every failure the dispatcher can observe ends up here: transport,
/// timeout, authentication, validation, malformed responses and the
/// local key-value storage. `motorlog-core` maps these into
/// consumer-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend answered 401. The stored token has already been cleared.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// Login/registration flow failed before a token could be stored.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the client-side deadline and was abandoned.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS configuration or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A header value (API key, bearer token) could not be encoded.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    // ── Backend responses ───────────────────────────────────────────
    /// HTTP 422 with a structured `errors` map.
    ///
    /// Displays as one `field: msg1, msg2` line per field.
    #[error("{}", flatten_field_errors(.errors))]
    Validation { errors: FieldErrors },

    /// Any other non-2xx response. `message` is the server's own text
    /// when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response was not JSON. `snippet` holds the start of the body.
    #[error("Unexpected response (HTTP {status}, content-type '{content_type}'): {snippet}")]
    UnexpectedContentType {
        status: u16,
        content_type: String,
        snippet: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Persisted key-value storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns `true` if this error means the session is gone and the
    /// user has to sign in again.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transport-level failure (the request
    /// never produced a usable HTTP response).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired => Some(401),
            Self::Validation { .. } => Some(422),
            Self::Api { status, .. } | Self::UnexpectedContentType { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Structured field errors for a 422 response.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}

/// Render validation errors as `field: message1, message2` lines joined by `\n`.
pub fn flatten_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}
