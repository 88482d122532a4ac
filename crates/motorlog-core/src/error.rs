// ── Core error types ──
//
// Consumer-facing errors from motorlog-core. The `From<motorlog_api::Error>`
// impl folds transport-level failures into the variants a screen (or the
// CLI) actually branches on. Validation errors stay structured.

use motorlog_api::FieldErrors;
use motorlog_api::error::flatten_field_errors;
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Cannot reach the backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// `timeout_secs` is `None` when the deadline that fired is unknown.
    #[error("Request timed out{}", after_secs(*.timeout_secs))]
    Timeout { timeout_secs: Option<u64> },

    /// The device is offline; the change was queued locally and has not
    /// reached the backend.
    #[error("Offline: change {change_id} saved for later")]
    QueuedOffline { change_id: Uuid },

    // ── Backend answers ──────────────────────────────────────────────
    #[error("{}", flatten_field_errors(.errors))]
    Validation { errors: FieldErrors },

    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    #[error("Unexpected response from backend: {message}")]
    UnexpectedResponse { message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Local storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Structured field errors for a rejected form.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }

    /// `true` when retrying later could succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::QueuedOffline { .. }
        )
    }
}

fn after_secs(secs: Option<u64>) -> String {
    secs.map(|s| format!(" after {s}s")).unwrap_or_default()
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<motorlog_api::Error> for CoreError {
    fn from(err: motorlog_api::Error) -> Self {
        use motorlog_api::Error as Api;

        match err {
            Api::SessionExpired => Self::SessionExpired,
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout { timeout_secs: None }
                } else {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            Api::Timeout { timeout_secs } => Self::Timeout {
                timeout_secs: Some(timeout_secs),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(reason) => Self::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            Api::InvalidHeader(message) => Self::Config { message },
            Api::Validation { errors } => Self::Validation { errors },
            Api::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            e @ (Api::UnexpectedContentType { .. } | Api::Deserialization { .. }) => {
                Self::UnexpectedResponse {
                    message: e.to_string(),
                }
            }
            Api::Storage(message) => Self::Storage { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_stays_structured() {
        let mut errors = FieldErrors::new();
        errors.insert("vin".into(), vec!["must be 17 characters".into()]);
        let core = CoreError::from(motorlog_api::Error::Validation { errors });

        assert_eq!(core.to_string(), "vin: must be 17 characters");
        assert_eq!(
            core.field_errors().map(|e| e["vin"].clone()),
            Some(vec!["must be 17 characters".to_owned()])
        );
    }

    #[test]
    fn session_expiry_is_preserved() {
        let core = CoreError::from(motorlog_api::Error::SessionExpired);
        assert!(core.is_auth_expired());
        assert_eq!(core.to_string(), "Session expired -- re-authentication required");
    }

    #[test]
    fn timeout_names_the_deadline_only_when_known() {
        let known = CoreError::from(motorlog_api::Error::Timeout { timeout_secs: 15 });
        assert_eq!(known.to_string(), "Request timed out after 15s");
        assert!(known.is_transient());

        let unknown = CoreError::Timeout { timeout_secs: None };
        assert_eq!(unknown.to_string(), "Request timed out");
    }

    #[test]
    fn api_message_passes_through() {
        let core = CoreError::from(motorlog_api::Error::Api {
            status: 500,
            message: "Request failed with status 500".into(),
        });
        assert_eq!(core.to_string(), "Request failed with status 500");
        assert!(!core.is_transient());
    }
}
