//! CLI configuration -- thin wrapper around `devconfig_config` shared types.
//!
//! Re-exports the shared types and applies `GlobalOpts` flag overrides
//! (--gateway, --store, --local, ...) on top of the active profile.

use secrecy::SecretString;

use devconfig_api::TransportConfig;
use devconfig_core::{CatalogMode, EngineConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use devconfig_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// The active profile with CLI overrides applied.
#[derive(Debug)]
pub struct Resolved {
    pub name: String,
    pub profile: Profile,
    pub defaults: Defaults,
}

impl Resolved {
    pub fn engine_config(&self) -> Result<EngineConfig, CliError> {
        Ok(devconfig_config::profile_to_engine_config(
            &self.profile,
            &self.defaults,
        )?)
    }

    pub fn transport(&self, global: &GlobalOpts) -> TransportConfig {
        devconfig_config::profile_to_transport(&self.profile, &self.defaults, self.token(global))
    }

    /// Token from the flag, else from the credential chain. Only looked up
    /// when an HTTP backend is configured.
    fn token(&self, global: &GlobalOpts) -> Option<SecretString> {
        if let Some(ref token) = global.token {
            return Some(SecretString::from(token.clone()));
        }
        let remote = (self.profile.gateway.is_some() && self.profile.points_file.is_none())
            || (self.profile.store.is_some() && self.profile.store_file.is_none());
        if remote {
            devconfig_config::resolve_token(&self.profile, &self.name)
        } else {
            None
        }
    }
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the config file and resolve the active profile.
///
/// A profile named with `--profile` must exist; otherwise an absent default
/// profile is empty and the flags alone describe the setup.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let mut cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.remove(&name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    Ok(Resolved {
        name,
        profile: apply_overrides(profile, global),
        defaults: cfg.defaults,
    })
}

/// Flag > env > profile.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref url) = global.gateway {
        profile.gateway = Some(url.clone());
        profile.points_file = None;
    }
    if let Some(ref url) = global.store {
        profile.store = Some(url.clone());
        profile.store_file = None;
    }
    if let Some(ref path) = global.points_file {
        profile.points_file = Some(path.clone());
    }
    if let Some(ref path) = global.store_file {
        profile.store_file = Some(path.clone());
    }
    if let Some(ref dir) = global.catalog_dir {
        profile.catalog_dir = Some(dir.clone());
    }
    if global.local {
        profile.mode = Some(CatalogMode::Local);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }
    profile
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["devconfig"];
        argv.extend_from_slice(args);
        argv.push("types");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile() {
        let profile = Profile {
            gateway: Some("https://gw.example/".into()),
            points_file: Some("old.json".into()),
            timeout: Some(9),
            ..Profile::default()
        };
        let g = global(&["--points-file", "new.json", "--local", "--timeout", "2"]);
        let profile = apply_overrides(profile, &g);
        assert_eq!(profile.points_file.as_deref(), Some(std::path::Path::new("new.json")));
        assert_eq!(profile.catalog_mode(), CatalogMode::Local);
        assert_eq!(profile.timeout, Some(2));
    }

    #[test]
    fn gateway_flag_replaces_profile_snapshot() {
        let profile = Profile {
            points_file: Some("points.json".into()),
            ..Profile::default()
        };
        let g = global(&["--gateway", "https://gw.example/"]);
        let profile = apply_overrides(profile, &g);
        assert!(profile.points_file.is_none());
        assert_eq!(profile.gateway.as_deref(), Some("https://gw.example/"));
    }

    #[test]
    fn default_profile_name() {
        let cfg = Config {
            default_profile: None,
            ..Config::default()
        };
        assert_eq!(active_profile_name(&global(&[]), &cfg), "default");
        assert_eq!(active_profile_name(&global(&["-p", "lab"]), &cfg), "lab");
    }
}
