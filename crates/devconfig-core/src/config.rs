// ── Runtime engine configuration ──
//
// These types describe *how* the engine loads its catalog, reads devices,
// and lays out reports. They never touch disk: the CLI builds an
// `EngineConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where the zone/type/schema catalog comes from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CatalogMode {
    /// Configuration store first, local dataset as fallback.
    #[default]
    Store,
    /// Local dataset only.
    Local,
}

/// Order of the diffing keys in a report.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiffOrder {
    /// Sorted by field key.
    #[default]
    Lexicographic,
    /// Declaration order of the field schema.
    Schema,
}

/// Configuration for one engine instance.
///
/// Built by the CLI, passed to `Engine` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial catalog source.
    pub mode: CatalogMode,
    /// Local dataset directory (`catalog.toml` + `schemas/`).
    pub catalog_dir: PathBuf,
    /// Upper bound for a single control-point read.
    pub read_timeout: Duration,
    pub diff_order: DiffOrder,
    /// Fail instead of warning when a schema field is missing from a
    /// stored record.
    pub strict_store: bool,
    /// Minimum report column width.
    pub min_width: usize,
    /// Spaces between report columns.
    pub column_offset: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: CatalogMode::Store,
            catalog_dir: PathBuf::from("db"),
            read_timeout: Duration::from_secs(5),
            diff_order: DiffOrder::Lexicographic,
            strict_store: false,
            min_width: 6,
            column_offset: 3,
        }
    }
}
