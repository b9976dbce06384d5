// ── Zone and device-type domain types ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An administrative region (a hutch) hosting one or more device types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Canonical lowercase name, unique across the catalog.
    pub name: String,
    pub aliases: BTreeSet<String>,
    pub device_types: BTreeSet<String>,
}

/// A class of device sharing one field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    /// Canonical lowercase name, e.g. `ims_motor`.
    pub name: String,
    /// Human display name, e.g. `motor`.
    pub display_name: String,
    /// Key of the field that uniquely names a device in the store.
    pub identity_field: String,
    /// Fields shown by a summary view, in display order.
    pub summary_fields: Vec<String>,
    pub log_level: Option<LogLevel>,
}

/// Per-type logging level carried by the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}
