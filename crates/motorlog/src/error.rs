//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use motorlog_config::ConfigError;
use motorlog_core::{CoreError, FieldErrors};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(motorlog::connection_failed),
        help(
            "{reason}\n\
             Check your network connection, or pass --offline to queue changes locally."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out{}", after_secs(*.seconds))]
    #[diagnostic(
        code(motorlog::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout { seconds: Option<u64> },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(motorlog::auth_failed),
        help("Check your email and password, then run: motorlog auth login")
    )]
    AuthFailed { message: String },

    #[error("Your session has expired")]
    #[diagnostic(
        code(motorlog::session_expired),
        help("Sign in again with: motorlog auth login")
    )]
    SessionExpired,

    #[error("No application key configured for profile '{profile}'")]
    #[diagnostic(
        code(motorlog::no_credentials),
        help(
            "Configure one with: motorlog config init\n\
             Or set the MOTORLOG_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Backend answers ──────────────────────────────────────────────
    #[error("The backend rejected the request")]
    #[diagnostic(code(motorlog::rejected), help("{details}"))]
    Rejected { details: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(motorlog::not_found),
        help("Run: motorlog {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Backend error ({status}): {message}")]
    #[diagnostic(code(motorlog::api_error))]
    ApiError { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(code(motorlog::api_error))]
    Backend { message: String },

    #[error("Unexpected response from the backend")]
    #[diagnostic(code(motorlog::unexpected_response), help("{message}"))]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(motorlog::validation))]
    Validation { field: String, reason: String },

    // ── Configuration & local state ──────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(motorlog::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: motorlog config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("{message}")]
    #[diagnostic(code(motorlog::config))]
    Config { message: String },

    #[error("Local storage error: {message}")]
    #[diagnostic(
        code(motorlog::storage),
        help("Check permissions on the data directory, or set one with --data-dir.")
    )]
    Storage { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::SessionExpired | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Rejected { .. } => exit_code::USAGE,
            Self::ApiError { status, .. } => match status {
                401 => exit_code::AUTH,
                403 => exit_code::PERMISSION,
                404 => exit_code::NOT_FOUND,
                409 => exit_code::CONFLICT,
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }
}

fn after_secs(seconds: Option<u64>) -> String {
    seconds.map(|s| format!(" after {s}s")).unwrap_or_default()
}

fn describe_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("  {field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionExpired => CliError::SessionExpired,

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            // Handlers report queued changes themselves; reaching here means
            // an operation that cannot be queued was attempted offline.
            CoreError::QueuedOffline { change_id } => CliError::Backend {
                message: format!("Offline: change {change_id} saved for later"),
            },

            CoreError::Validation { errors } => CliError::Rejected {
                details: describe_field_errors(&errors),
            },

            CoreError::Api {
                message,
                status: Some(status),
            } => CliError::ApiError { status, message },

            CoreError::Api {
                message,
                status: None,
            } => CliError::Backend { message },

            CoreError::UnexpectedResponse { message } => CliError::UnexpectedResponse { message },

            CoreError::Storage { message } => CliError::Storage { message },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
