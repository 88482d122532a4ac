//! CLI configuration -- thin wrapper around `motorlog_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--base-url,
//! --api-key, --data-dir, ...) and builds the `Garage` commands run against.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use motorlog_core::{FileStore, Garage};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use motorlog_config::{Config, Defaults, Profile};

// ── File location ───────────────────────────────────────────────────

/// `--config`, else the platform config path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config_file
        .clone()
        .unwrap_or_else(motorlog_config::config_path)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default(global: &GlobalOpts) -> Config {
    motorlog_config::load_config_from(&config_file(global)).unwrap_or_default()
}

pub fn save_config(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    motorlog_config::save_config_to(cfg, &config_file(global))?;
    Ok(())
}

pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

// ── Resolution ──────────────────────────────────────────────────────

/// A profile with every CLI override applied.
pub struct Resolved {
    pub name: String,
    pub profile: Profile,
    pub defaults: Defaults,
}

/// Pick the active profile and layer flag overrides on top.
///
/// A missing profile is only an error when it was asked for by name; the
/// implicit `default` profile falls back to built-in values so that
/// `--base-url`/`--api-key` alone are enough.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = motorlog_config::load_config_from(&config_file(global))?;
    let name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(p) => p.clone(),
        None if global.profile.is_none() => Profile::default(),
        None => {
            return Err(CliError::ProfileNotFound {
                name,
                available: cfg.available_profiles(),
            });
        }
    };

    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if let Some(ref locale) = global.locale {
        profile.locale = Some(locale.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(ref dir) = global.data_dir {
        profile.data_dir = Some(dir.clone());
    }

    Ok(Resolved {
        name,
        profile,
        defaults: cfg.defaults,
    })
}

/// `--api-key` wins; otherwise the shared env/keyring/plaintext chain.
fn resolve_api_key_with_flag(
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref key) = global.api_key {
        return Ok(SecretString::from(key.clone()));
    }
    Ok(motorlog_config::resolve_api_key(
        &resolved.profile,
        &resolved.name,
    )?)
}

/// Build the `Garage` for this invocation. Session, dictionary cache and
/// offline copies live in the profile's data directory.
pub fn build_garage(global: &GlobalOpts) -> Result<Garage, CliError> {
    let resolved = resolve(global)?;
    let api_key = resolve_api_key_with_flag(&resolved, global)?;
    let client_config =
        motorlog_config::to_client_config(&resolved.profile, &resolved.defaults, api_key)?;

    let data_dir = motorlog_config::profile_data_dir(&resolved.profile, &resolved.name);
    tracing::debug!(
        profile = %resolved.name,
        base_url = %client_config.base_url,
        data_dir = %data_dir.display(),
        "building client"
    );

    let garage = Garage::new(client_config, Arc::new(FileStore::new(data_dir)))?;
    if global.offline {
        garage.set_online(false);
    }
    Ok(garage)
}
