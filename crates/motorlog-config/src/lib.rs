//! Shared configuration for motorlog tools.
//!
//! TOML profiles (one per backend), platform config/data directories,
//! API-key resolution (env + keyring + plaintext) and translation to
//! `motorlog_core::ClientConfig`. The CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use motorlog_core::{ClientConfig, TlsVerification};

/// Keyring service name for stored API keys.
pub const KEYRING_SERVICE: &str = "motorlog";

/// Production backend.
pub const DEFAULT_BASE_URL: &str = "https://api.motorlog.app/api/v1";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// `flag`, else the configured default, else `"default"`.
    pub fn active_profile_name(&self, flag: Option<&str>) -> String {
        flag.map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated profile names, or `(none)`.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_dictionary_max_age_hours")]
    pub dictionary_max_age_hours: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            locale: default_locale(),
            dictionary_max_age_hours: default_dictionary_max_age_hours(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    15
}
fn default_locale() -> String {
    motorlog_core::config::DEFAULT_LOCALE.into()
}
fn default_dictionary_max_age_hours() -> u64 {
    24
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

/// One backend and the account used with it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API root including the version prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Application key (plaintext -- prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the application key.
    pub api_key_env: Option<String>,

    /// Dictionary language; falls back to `defaults.locale`.
    pub locale: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept any TLS certificate (development backends).
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    pub dictionary_max_age_hours: Option<u64>,

    /// Where session, cache and offline data live. Defaults to
    /// `<platform data dir>/<profile name>`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: None,
            locale: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            dictionary_max_age_hours: None,
            data_dir: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "motorlog", "motorlog")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "motorlog", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Root of the per-profile data directories.
pub fn data_root() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "motorlog"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Data directory for one profile.
pub fn profile_data_dir(profile: &Profile, profile_name: &str) -> PathBuf {
    profile
        .data_dir
        .clone()
        .unwrap_or_else(|| data_root().join(profile_name))
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then
/// `MOTORLOG_`-prefixed environment variables (`__` separates levels,
/// e.g. `MOTORLOG_DEFAULTS__LOCALE=de`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MOTORLOG_").split("__"))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize to TOML and write `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Resolve the application key: env var named by `api_key_env`, then the
/// system keyring, then plaintext in the profile.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store the application key for `profile_name` in the system keyring.
pub fn store_api_key(profile_name: &str, secret: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?
        .set_password(secret)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from a profile and an already-resolved key.
pub fn to_client_config(
    profile: &Profile,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let base_url: url::Url = profile
        .base_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL '{}': {e}", profile.base_url),
        })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    let max_age_hours = profile
        .dictionary_max_age_hours
        .unwrap_or(defaults.dictionary_max_age_hours);

    let mut config = ClientConfig::new(base_url, api_key)
        .with_locale(profile.locale.as_deref().unwrap_or(&defaults.locale))
        .with_timeout(Duration::from_secs(timeout))
        .with_dictionary_max_age(Duration::from_secs(max_age_hours.saturating_mul(3600)));
    config.tls = tls;
    Ok(config)
}

/// Resolve the key from the credential chain and build a `ClientConfig`.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let api_key = resolve_api_key(profile, profile_name)?;
    to_client_config(profile, defaults, api_key)
}
