// ── Runtime client configuration ──
//
// Describes how to reach the backend and how long cached data stays
// fresh. Built by the CLI (or any other host) and handed to `Garage`;
// nothing in this crate reads config files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use motorlog_api::transport::DEFAULT_TIMEOUT;
use motorlog_api::{TlsMode, TransportConfig};

/// Locale used for dictionary requests when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// How long a cached dictionary is served without waiting on the network.
pub const DEFAULT_DICTIONARY_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only for local development backends.
    DangerAcceptInvalid,
}

/// Everything `Garage` needs to talk to one backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root including the version prefix, e.g. `https://api.motorlog.app/api/v1`.
    pub base_url: Url,
    /// Static application key sent as `X-API-Key`.
    pub api_key: SecretString,
    /// Language tag for reference dictionaries.
    pub locale: String,
    pub tls: TlsVerification,
    /// Per-request deadline.
    pub timeout: Duration,
    pub dictionary_max_age: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            locale: DEFAULT_LOCALE.to_owned(),
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            dictionary_max_age: DEFAULT_DICTIONARY_MAX_AGE,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_dictionary_max_age(mut self, max_age: Duration) -> Self {
        self.dictionary_max_age = max_age;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
