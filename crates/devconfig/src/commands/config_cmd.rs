//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use devconfig_core::CatalogMode;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const SETTABLE_KEYS: &str = "mode, catalog_dir, gateway, store, token_env, points_file, \
                             store_file, strict_store, ca_cert, insecure, timeout";

// ── Helpers ─────────────────────────────────────────────────────────

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn parse_flag(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// TOML rendering of the config with plaintext tokens masked.
fn format_config_redacted(cfg: &Config) -> String {
    let mut value = match toml::Value::try_from(cfg) {
        Ok(value) => value,
        Err(e) => return format!("failed to render config: {e}"),
    };
    if let Some(profiles) = value.get_mut("profiles").and_then(toml::Value::as_table_mut) {
        for (_, profile) in profiles.iter_mut() {
            if let Some(token) = profile.get_mut("token") {
                *token = toml::Value::String("********".into());
            }
        }
    }
    toml::to_string_pretty(&value).unwrap_or_else(|e| format!("failed to render config: {e}"))
}

fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "mode" => {
            let mode = value.parse::<CatalogMode>().map_err(|_| CliError::Validation {
                field: "mode".into(),
                reason: "must be 'store' or 'local'".into(),
            })?;
            profile.mode = Some(mode);
        }
        "catalog_dir" | "catalog-dir" => profile.catalog_dir = Some(PathBuf::from(value)),
        "gateway" => profile.gateway = Some(value),
        "store" => profile.store = Some(value),
        "token_env" | "token-env" => profile.token_env = Some(value),
        "points_file" | "points-file" => profile.points_file = Some(PathBuf::from(value)),
        "store_file" | "store-file" => profile.store_file = Some(PathBuf::from(value)),
        "strict_store" | "strict-store" => profile.strict_store = parse_flag(key, &value)?,
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(PathBuf::from(value)),
        "insecure" => profile.insecure = Some(parse_flag(key, &value)?),
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
            });
        }
    }
    // Catch malformed URLs now rather than on the next diff.
    profile.gateway_url()?;
    profile.store_url()?;
    Ok(())
}

fn store_token_interactively(profile_name: &str) -> Result<(), CliError> {
    let token = rpassword::prompt_password("Token: ").map_err(CliError::prompt)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    devconfig_config::store_token(profile_name, &token)?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("devconfig configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(CliError::prompt)?;

            let catalog_dir: String = Input::new()
                .with_prompt("Local dataset directory")
                .default(devconfig_config::default_catalog_dir().display().to_string())
                .interact_text()
                .map_err(CliError::prompt)?;

            let gateway: String = Input::new()
                .with_prompt("Control-point gateway URL (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(CliError::prompt)?;

            let store: String = Input::new()
                .with_prompt("Configuration store URL (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(CliError::prompt)?;

            let profile = Profile {
                catalog_dir: Some(PathBuf::from(catalog_dir)),
                gateway: optional(&gateway),
                store: optional(&store),
                ..Profile::default()
            };
            profile.gateway_url()?;
            profile.store_url()?;

            if (profile.gateway.is_some() || profile.store.is_some())
                && Confirm::new()
                    .with_prompt("Store a bearer token in the system keyring?")
                    .default(false)
                    .interact()
                    .map_err(CliError::prompt)?
            {
                store_token_interactively(&profile_name)?;
                eprintln!("   Token stored in system keyring");
            }

            let mut cfg = config::load_config_or_default();
            cfg.default_profile = Some(profile_name.clone());
            cfg.profiles.insert(profile_name.clone(), profile);
            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: devconfig zones");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: devconfig config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }
            store_token_interactively(&profile_name)?;
            eprintln!("Token for profile '{profile_name}' stored in system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_key_parses_typed_values() {
        let mut profile = Profile::default();
        set_key(&mut profile, "mode", "local".into()).unwrap();
        set_key(&mut profile, "strict-store", "true".into()).unwrap();
        set_key(&mut profile, "timeout", "3".into()).unwrap();
        assert_eq!(profile.mode, Some(CatalogMode::Local));
        assert!(profile.strict_store);
        assert_eq!(profile.timeout, Some(3));
    }

    #[test]
    fn set_key_rejects_unknown_keys_and_bad_urls() {
        let mut profile = Profile::default();
        assert!(matches!(
            set_key(&mut profile, "controller", "x".into()),
            Err(CliError::Validation { .. })
        ));
        assert!(set_key(&mut profile, "gateway", "not a url".into()).is_err());
    }

    #[test]
    fn show_masks_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                token: Some("secret".into()),
                ..Profile::default()
            },
        );
        let text = format_config_redacted(&cfg);
        assert!(!text.contains("secret"));
        assert!(text.contains("********"));
    }
}
