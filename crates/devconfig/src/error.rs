//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use devconfig_config::ConfigError;
use devconfig_core::{CatalogError, CoreError, SnapshotError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const AMBIGUOUS: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Configuration store unavailable: {reason}")]
    #[diagnostic(
        code(devconfig::store_unavailable),
        help(
            "Check the store URL of your profile or pass --store.\n\
             Work offline with --store-file and --local."
        )
    )]
    StoreUnavailable { reason: String },

    #[error("Identity field {field} of {address} could not be read")]
    #[diagnostic(
        code(devconfig::identity_unreadable),
        help(
            "The device must be online to look up its stored record.\n\
             Try: devconfig view {address}"
        )
    )]
    IdentityUnreadable { address: String, field: String },

    #[error("No {what} configured")]
    #[diagnostic(code(devconfig::no_backend), help("{hint}"))]
    NoBackend { what: String, hint: String },

    #[error("HTTP client setup failed: {0}")]
    #[diagnostic(code(devconfig::http))]
    Http(#[from] devconfig_api::Error),

    // ── Store answers ────────────────────────────────────────────────
    #[error("Configuration store error ({code}): {message}")]
    #[diagnostic(
        code(devconfig::store_error),
        help("If the store requires a token, run: devconfig config set-token")
    )]
    StoreError { code: String, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(devconfig::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    #[error("Cannot tell which device type {address} is")]
    #[diagnostic(
        code(devconfig::ambiguous_type),
        help("Pass one of the candidates with --type: {candidates}")
    )]
    AmbiguousType { address: String, candidates: String },

    // ── Consistency ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(devconfig::inconsistent),
        help("The stored record and the field schema disagree. Unset strict_store to continue with a warning.")
    )]
    Inconsistent { message: String },

    #[error("Catalog unavailable: {message}")]
    #[diagnostic(
        code(devconfig::catalog),
        help("Check catalog.toml and schemas/ under the catalog directory (--catalog-dir).")
    )]
    Catalog { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(devconfig::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(devconfig::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: devconfig config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(devconfig::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(devconfig::snapshot),
        help("Snapshot files are JSON; see `devconfig --help` for --points-file and --store-file.")
    )]
    Snapshot(#[from] SnapshotError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StoreUnavailable { .. } | Self::IdentityUnreadable { .. } | Self::Http(_) => {
                exit_code::CONNECTION
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::AmbiguousType { .. } => exit_code::AMBIGUOUS,
            Self::Inconsistent { .. } => exit_code::CONFLICT,
            Self::StoreError { code, .. } if code == "rejected" => exit_code::AUTH,
            Self::Validation { .. } | Self::NoBackend { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub(crate) fn prompt(e: impl std::fmt::Display) -> Self {
        Self::Validation {
            field: "interactive".into(),
            reason: format!("prompt failed: {e}"),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { reason } => Self::StoreUnavailable { reason },
            StoreError::Rejected { message } => Self::StoreError {
                code: "rejected".into(),
                message,
            },
            StoreError::Malformed { message } => Self::StoreError {
                code: "malformed".into(),
                message,
            },
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Store(e) => e.into(),
            other => Self::Catalog {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidZone { input } => Self::NotFound {
                resource_type: "zone".into(),
                identifier: input.join(", "),
                hint: "Run: devconfig zones".into(),
            },

            CoreError::InvalidDeviceType { input } => Self::NotFound {
                resource_type: "device type".into(),
                identifier: input.join(", "),
                hint: "Run: devconfig types".into(),
            },

            CoreError::AmbiguousInference {
                address,
                candidates,
            } => Self::AmbiguousType {
                address,
                candidates: candidates.join(", "),
            },

            CoreError::MixedDeviceTypes { types } => Self::Validation {
                field: "addresses".into(),
                reason: format!(
                    "devices of different types cannot be compared ({})",
                    types.join(", ")
                ),
            },

            CoreError::SchemaLoad {
                device_type,
                reason,
            } => Self::Catalog {
                message: format!("no field schema for {device_type}: {reason}"),
            },

            CoreError::Catalog(e) => e.into(),

            CoreError::IdentityUnreadable { address, field } => {
                Self::IdentityUnreadable { address, field }
            }

            CoreError::Store(e) => e.into(),

            CoreError::NotFoundInStore {
                device_type,
                identity_field,
                value,
            } => Self::NotFound {
                resource_type: format!("stored {device_type}"),
                identifier: value,
                hint: format!("No object in the configuration store has {identity_field} set to this value."),
            },

            err @ CoreError::SchemaMismatch { .. } => Self::Inconsistent {
                message: err.to_string(),
            },

            CoreError::InsufficientSources { found } => Self::Validation {
                field: "addresses".into(),
                reason: format!(
                    "a diff needs two addresses, or one with --pmgr (got {found})"
                ),
            },

            CoreError::InvalidAddress { address } => Self::Validation {
                field: "address".into(),
                reason: format!("'{address}' is not a control-point address"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguity_has_its_own_exit_code() {
        let err = CliError::from(CoreError::AmbiguousInference {
            address: "XPP:MMS:01".into(),
            candidates: vec!["gige_cam".into(), "ims_motor".into()],
        });
        assert_eq!(err.exit_code(), exit_code::AMBIGUOUS);
        assert!(matches!(err, CliError::AmbiguousType { ref candidates, .. } if candidates == "gige_cam, ims_motor"));
    }

    #[test]
    fn store_outage_is_a_connection_failure() {
        let err = CliError::from(CoreError::Catalog(CatalogError::Store(
            StoreError::Unavailable {
                reason: "connection refused".into(),
            },
        )));
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn unknown_zone_points_at_the_listing() {
        let err = CliError::from(CoreError::InvalidZone {
            input: vec!["bogus".into()],
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(err, CliError::NotFound { ref hint, .. } if hint.contains("devconfig zones")));
    }
}
