// ── Core error types ──
//
// User-facing errors from devconfig-core. Consumers never see HTTP status
// codes directly: collaborator failures arrive as `StoreError` /
// `TransportError` and catalog problems as `CatalogError`.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::source::StoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("No valid zone in: {}", input.join(", "))]
    InvalidZone { input: Vec<String> },

    #[error("No valid device type in: {}", input.join(", "))]
    InvalidDeviceType { input: Vec<String> },

    #[error(
        "Cannot infer the device type of {address}: candidates are {}",
        candidates.join(", ")
    )]
    AmbiguousInference {
        address: String,
        candidates: Vec<String>,
    },

    #[error("Addresses resolve to different device types: {}", types.join(", "))]
    MixedDeviceTypes { types: Vec<String> },

    #[error("Field schema for '{device_type}' is unavailable: {reason}")]
    SchemaLoad { device_type: String, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    // ── Connectivity errors ──────────────────────────────────────────
    #[error("Identity field {field} of {address} could not be read")]
    IdentityUnreadable { address: String, field: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    // ── Consistency errors ───────────────────────────────────────────
    #[error("No {device_type} object with {identity_field} = '{value}' in the configuration store")]
    NotFoundInStore {
        device_type: String,
        identity_field: String,
        value: String,
    },

    #[error("Field {field} is in the schema but in neither the stored object nor its configuration")]
    SchemaMismatch { field: String },

    // ── Contract errors ──────────────────────────────────────────────
    #[error("Diff needs at least two sources, got {found}")]
    InsufficientSources { found: usize },

    #[error("Cannot form a control-point address from '{address}'")]
    InvalidAddress { address: String },
}
