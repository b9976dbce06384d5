//! Shared configuration for the devconfig tools.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `devconfig_core::EngineConfig` and the HTTP transport
//! settings. The CLI adds `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
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

use devconfig_api::{TlsMode, TransportConfig};
use devconfig_core::{CatalogMode, DiffOrder, EngineConfig};

/// Keyring service name tokens are stored under.
pub const KEYRING_SERVICE: &str = "devconfig";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("keyring access failed: {reason}")]
    Keyring { reason: String },

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named site profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-read timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_min_width")]
    pub min_width: usize,

    #[serde(default = "default_column_offset")]
    pub column_offset: usize,

    #[serde(default)]
    pub diff_order: DiffOrder,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            min_width: default_min_width(),
            column_offset: default_column_offset(),
            diff_order: DiffOrder::default(),
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
    5
}
fn default_min_width() -> usize {
    6
}
fn default_column_offset() -> usize {
    3
}

/// A named site profile.
///
/// Every backend is optional: a profile with only `catalog_dir` and
/// `points_file` works fully offline.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Catalog source. Defaults to `store` when a store is configured.
    pub mode: Option<CatalogMode>,

    /// Local dataset directory (`catalog.toml` + `schemas/`).
    pub catalog_dir: Option<PathBuf>,

    /// Control-point gateway base URL.
    pub gateway: Option<String>,

    /// Configuration store base URL.
    pub store: Option<String>,

    /// Bearer token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// JSON snapshot of control points, used instead of the gateway.
    pub points_file: Option<PathBuf>,

    /// JSON dump of the store, used instead of the store URL.
    pub store_file: Option<PathBuf>,

    /// Fail when a schema field is missing from a stored record.
    #[serde(default)]
    pub strict_store: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed certificates.
    pub insecure: Option<bool>,

    /// Override the default timeout.
    pub timeout: Option<u64>,
}

impl Profile {
    /// Catalog mode, inferred from the configured backends when unset.
    pub fn catalog_mode(&self) -> CatalogMode {
        self.mode.unwrap_or(if self.store.is_some() || self.store_file.is_some() {
            CatalogMode::Store
        } else {
            CatalogMode::Local
        })
    }

    /// Validated gateway URL, if any.
    pub fn gateway_url(&self) -> Result<Option<&str>, ConfigError> {
        self.gateway.as_deref().map(|u| validate_url("gateway", u)).transpose()
    }

    /// Validated store URL, if any.
    pub fn store_url(&self) -> Result<Option<&str>, ConfigError> {
        self.store.as_deref().map(|u| validate_url("store", u)).transpose()
    }
}

fn validate_url<'a>(field: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    url::Url::parse(value)
        .map(|_| value)
        .map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "devconfig", "devconfig")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Dataset directory used when a profile names none.
pub fn default_catalog_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("db"),
        |dirs| dirs.data_dir().join("db"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("devconfig");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// Nested keys come from `DEVCONFIG_` variables split on `__`, e.g.
/// `DEVCONFIG_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DEVCONFIG_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the bearer token from the credential chain (no CLI flag step).
///
/// A missing token is not an error: both servers may allow anonymous reads.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    token_chain(
        profile,
        |name| std::env::var(name).ok(),
        || {
            keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

/// Store `token` in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .and_then(|entry| entry.set_password(token))
        .map_err(|e| ConfigError::Keyring {
            reason: e.to_string(),
        })
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

fn token_chain(
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's token_env -> env var lookup
    if let Some(val) = profile.token_env.as_deref().and_then(&env) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(secret) = keyring() {
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `EngineConfig` from a profile and the global defaults.
pub fn profile_to_engine_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<EngineConfig, ConfigError> {
    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }

    Ok(EngineConfig {
        mode: profile.catalog_mode(),
        catalog_dir: profile
            .catalog_dir
            .clone()
            .unwrap_or_else(default_catalog_dir),
        read_timeout: Duration::from_secs(timeout),
        diff_order: defaults.diff_order,
        strict_store: profile.strict_store,
        min_width: defaults.min_width,
        column_offset: defaults.column_offset,
    })
}

/// HTTP transport settings shared by the gateway and store clients.
pub fn profile_to_transport(
    profile: &Profile,
    defaults: &Defaults,
    token: Option<SecretString>,
) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        token,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let d = Defaults::default();
        assert_eq!(d.output, "table");
        assert_eq!(d.timeout, 5);
        assert_eq!(d.min_width, 6);
        assert_eq!(d.column_offset, 3);
        assert_eq!(d.diff_order, DiffOrder::Lexicographic);
    }

    #[test]
    fn loads_profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lcls"

[defaults]
timeout = 2
diff_order = "schema"

[profiles.lcls]
catalog_dir = "/srv/devconfig/db"
store = "https://pmgr.example/api/"
strict_store = true
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lcls"));
        assert_eq!(cfg.defaults.diff_order, DiffOrder::Schema);
        assert_eq!(cfg.defaults.min_width, 6);

        let profile = &cfg.profiles["lcls"];
        assert_eq!(profile.catalog_mode(), CatalogMode::Store);
        assert_eq!(profile.store_url().unwrap(), Some("https://pmgr.example/api/"));

        let engine = profile_to_engine_config(profile, &cfg.defaults).unwrap();
        assert_eq!(engine.read_timeout, Duration::from_secs(2));
        assert_eq!(engine.catalog_dir, PathBuf::from("/srv/devconfig/db"));
        assert!(engine.strict_store);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                points_file: Some("points.json".into()),
                mode: Some(CatalogMode::Local),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = &loaded.profiles["default"];
        assert_eq!(profile.points_file, Some(PathBuf::from("points.json")));
        assert_eq!(profile.mode, Some(CatalogMode::Local));
    }

    #[test]
    fn mode_follows_configured_backends() {
        assert_eq!(Profile::default().catalog_mode(), CatalogMode::Local);
        let offline_store = Profile {
            store_file: Some("store.json".into()),
            ..Profile::default()
        };
        assert_eq!(offline_store.catalog_mode(), CatalogMode::Store);
        let forced = Profile {
            mode: Some(CatalogMode::Local),
            store: Some("https://pmgr.example/".into()),
            ..Profile::default()
        };
        assert_eq!(forced.catalog_mode(), CatalogMode::Local);
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let profile = Profile {
            gateway: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile.gateway_url().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "gateway"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let profile = Profile {
            timeout: Some(0),
            ..Profile::default()
        };
        assert!(profile_to_engine_config(&profile, &Defaults::default()).is_err());
    }

    #[test]
    fn token_chain_prefers_env_then_keyring_then_plaintext() {
        let profile = Profile {
            token: Some("plain".into()),
            token_env: Some("MY_TOKEN".into()),
            ..Profile::default()
        };

        let from_env = token_chain(
            &profile,
            |name| (name == "MY_TOKEN").then(|| "env".to_owned()),
            || Some("keyring".into()),
        );
        assert_eq!(from_env.unwrap().expose_secret(), "env");

        let from_keyring = token_chain(&profile, |_| None, || Some("keyring".into()));
        assert_eq!(from_keyring.unwrap().expose_secret(), "keyring");

        let plaintext = token_chain(&profile, |_| None, || None);
        assert_eq!(plaintext.unwrap().expose_secret(), "plain");

        assert!(token_chain(&Profile::default(), |_| None, || None).is_none());
    }

    #[test]
    fn transport_honours_tls_settings() {
        let insecure = Profile {
            insecure: Some(true),
            ca_cert: Some("/etc/ca.pem".into()),
            ..Profile::default()
        };
        let t = profile_to_transport(&insecure, &Defaults::default(), None);
        assert!(matches!(t.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(t.timeout, Duration::from_secs(5));

        let custom = Profile {
            ca_cert: Some("/etc/ca.pem".into()),
            ..Profile::default()
        };
        let t = profile_to_transport(&custom, &Defaults::default(), None);
        assert!(matches!(t.tls, TlsMode::CustomCa(ref p) if p == Path::new("/etc/ca.pem")));
    }
}
