// Wire types for the gateway and configuration-store JSON APIs.
//
// These mirror the server payloads one-to-one; `devconfig-core` converts
// them into domain types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Gateway ─────────────────────────────────────────────────────────

/// `GET points/{address}` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointReading {
    pub address: String,
    /// Scalar value as reported by the control system.
    #[serde(default)]
    pub value: Value,
    /// `false` when the gateway has no live connection to the point.
    #[serde(default = "default_true")]
    pub connected: bool,
}

fn default_true() -> bool {
    true
}

// ── Configuration store ─────────────────────────────────────────────

/// A physical-device record (pmgr "obj").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreObject {
    pub id: u64,
    pub name: String,
    /// Id of the associated logical configuration, if linked.
    #[serde(default)]
    pub config: Option<u64>,
    /// Object-scoped field values keyed by field key.
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

/// A logical configuration record (pmgr "cfg").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

/// List envelope used by collection endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
}

// ── Catalog ─────────────────────────────────────────────────────────

/// `GET catalog` response: the devconfig metadata kept in the store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub hutches: Vec<HutchRecord>,
    #[serde(default)]
    pub obj_types: Vec<ObjTypeRecord>,
    /// Field maps keyed by objType name.
    #[serde(default)]
    pub fld_maps: HashMap<String, Vec<FieldRecord>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HutchRecord {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub obj_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjTypeRecord {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_field: String,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldRecord {
    pub fld: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub pv: String,
    #[serde(default)]
    pub enums: Option<Vec<String>>,
    #[serde(default)]
    pub obj: bool,
}
