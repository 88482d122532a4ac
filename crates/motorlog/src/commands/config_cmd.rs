//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "locale = \"{}\"", cfg.defaults.locale);
    let _ = writeln!(
        out,
        "dictionary_max_age_hours = {}",
        cfg.defaults.dictionary_max_age_hours
    );

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "base_url = \"{}\"", p.base_url);
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref locale) = p.locale {
            let _ = writeln!(out, "locale = \"{locale}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(hours) = p.dictionary_max_age_hours {
            let _ = writeln!(out, "dictionary_max_age_hours = {hours}");
        }
        if let Some(ref dir) = p.data_dir {
            let _ = writeln!(out, "data_dir = \"{}\"", dir.display());
        }
    }

    out.trim_end().to_string()
}

/// Serializable view with secrets masked, for json/yaml output.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some("****".into());
        }
    }
    cfg
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "base_url" | "base-url" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL '{value}': {e}"),
            })?;
            profile.base_url = value;
        }
        "api_key" | "api-key" => profile.api_key = Some(value),
        "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
        "locale" => profile.locale = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "timeout" => {
            let secs: u64 = parse_value(key, &value, "a number (seconds)")?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            profile.timeout = Some(secs);
        }
        "dictionary_max_age_hours" | "dictionary-max-age-hours" => {
            profile.dictionary_max_age_hours =
                Some(parse_value(key, &value, "a number (hours)")?);
        }
        "data_dir" | "data-dir" => profile.data_dir = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: base_url, api_key, api_key_env, \
                     locale, ca_cert, insecure, timeout, dictionary_max_age_hours, data_dir"
                ),
            });
        }
    }
    Ok(())
}

fn read_api_key() -> Result<String, CliError> {
    let key = rpassword::prompt_password("Application key: ").map_err(prompt_err)?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "application key cannot be empty".into(),
        });
    }
    Ok(key)
}

/// Offer to store the key in the system keyring or return it for plaintext config.
///
/// Returns `Some(key)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(key: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the application key?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        motorlog_config::store_api_key(profile_name, key)?;
        eprintln!("   ✓ Application key stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(key.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let config_path = config::config_file(global);
            eprintln!("motorlog -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("Backend URL")
                .default(motorlog_config::DEFAULT_BASE_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let locale: String = Input::new()
                .with_prompt("Language for reference lists")
                .default(motorlog_core::config::DEFAULT_LOCALE.into())
                .interact_text()
                .map_err(prompt_err)?;

            let key = read_api_key()?;
            let api_key = prompt_keyring_storage(&key, &profile_name)?;

            let mut profile = Profile {
                api_key,
                locale: Some(locale),
                ..Profile::default()
            };
            set_profile_key(&mut profile, "base_url", base_url)?;

            let mut cfg = config::load_config_or_default(global);
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg, global)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: motorlog auth login");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default(global));
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |c| {
                c.default_profile.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;
            config::save_config(&cfg, global)?;
            output::print_done(global, &format!("Set {key} on profile '{profile_name}'"));
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default(global);
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: motorlog config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default(global);
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: cfg.available_profiles(),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg, global)?;
            output::print_done(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }

        ConfigCommand::SetKey => {
            let cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);
            cfg.profile(&profile_name)?;

            let key = read_api_key()?;
            motorlog_config::store_api_key(&profile_name, &key)?;
            output::print_done(
                global,
                &format!("Application key stored in system keyring for profile '{profile_name}'"),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_validates_values() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "timeout", "30".into()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(profile.timeout, Some(30));

        assert!(set_profile_key(&mut profile, "timeout", "0".into()).is_err());
        assert!(set_profile_key(&mut profile, "base_url", "not a url".into()).is_err());
        assert!(set_profile_key(&mut profile, "colour", "red".into()).is_err());
    }

    #[test]
    fn show_masks_plaintext_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_key: Some("super-secret".into()),
                ..Profile::default()
            },
        );
        let text = format_config_redacted(&redacted(&cfg));
        assert!(text.contains("api_key = \"****\""));
        assert!(!text.contains("super-secret"));
    }
}
