// ── Zone / device-type / schema catalog ──
//
// A `Catalog` is an immutable snapshot built from `CatalogData` by
// `Catalog::from_data`. Structural problems (duplicate zones, alias clashes)
// reject the whole snapshot; a bad schema only marks its own device type as
// failed and loading continues with the rest.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CatalogMode;
use crate::error::CoreError;
use crate::model::{DeviceType, FieldDefinition, FieldSchema, FieldSelector, LogLevel, Zone};
use crate::source::StoreError;

pub mod loader;
pub mod local;

pub use loader::{CatalogSource, StoreCatalog, load_catalog};
pub use local::LocalCatalog;

// ── Errors ──────────────────────────────────────────────────────────

/// The catalog as a whole could not be loaded.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read catalog file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse catalog file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid catalog: {reason}")]
    Invalid { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One device type whose schema could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{device_type}: {reason}")]
pub struct SchemaLoadError {
    pub device_type: String,
    pub reason: String,
}

// ── Raw catalog data ────────────────────────────────────────────────

/// Zone as delivered by a catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoneData {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub device_types: Vec<String>,
}

/// Device type as delivered by a catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceTypeData {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub identity_field: String,
    #[serde(default)]
    pub summary_fields: Vec<String>,
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Unvalidated catalog contents, whatever the source.
#[derive(Debug, Clone, Default)]
pub struct CatalogData {
    pub zones: Vec<ZoneData>,
    pub device_types: Vec<DeviceTypeData>,
    /// Field definitions per device type, in declaration order.
    pub schemas: BTreeMap<String, Vec<FieldDefinition>>,
    /// Per-type failures the source already hit while reading.
    pub load_failures: Vec<SchemaLoadError>,
}

// ── Snapshot ────────────────────────────────────────────────────────

/// Validated, immutable catalog snapshot.
#[derive(Debug, Clone)]
pub struct Catalog {
    zones: BTreeMap<String, Zone>,
    aliases: BTreeMap<String, BTreeSet<String>>,
    device_types: BTreeMap<String, DeviceType>,
    schemas: BTreeMap<String, FieldSchema>,
    failures: Vec<SchemaLoadError>,
    mode: CatalogMode,
    requested: CatalogMode,
    loaded_at: DateTime<Utc>,
    fallback_reason: Option<String>,
}

impl Catalog {
    /// Validate raw data into a snapshot.
    pub fn from_data(data: CatalogData, mode: CatalogMode) -> Result<Self, CatalogError> {
        let mut failures = data.load_failures;

        let mut device_types = BTreeMap::new();
        for raw in data.device_types {
            let name = raw.name.to_lowercase();
            let log_level = match raw.log_level.as_deref().map(LogLevel::from_str).transpose() {
                Ok(level) => level,
                Err(_) => {
                    failures.push(SchemaLoadError {
                        device_type: name.clone(),
                        reason: format!(
                            "invalid log level '{}'",
                            raw.log_level.unwrap_or_default()
                        ),
                    });
                    None
                }
            };
            let device_type = DeviceType {
                display_name: raw.display_name.unwrap_or_else(|| name.clone()),
                name: name.clone(),
                identity_field: raw.identity_field,
                summary_fields: raw.summary_fields,
                log_level,
            };
            if device_types.insert(name.clone(), device_type).is_some() {
                return Err(CatalogError::Invalid {
                    reason: format!("device type {name} is defined twice"),
                });
            }
        }

        let mut zones = BTreeMap::new();
        let mut aliases: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for raw in data.zones {
            let name = raw.name.to_lowercase();
            let mut hosted = BTreeSet::new();
            for t in raw.device_types {
                let t = t.to_lowercase();
                if device_types.contains_key(&t) {
                    hosted.insert(t);
                } else {
                    warn!(zone = %name, device_type = %t, "zone hosts an unknown device type, ignoring");
                }
            }
            let zone_aliases: BTreeSet<String> =
                raw.aliases.iter().map(|a| a.to_lowercase()).collect();
            for alias in &zone_aliases {
                aliases
                    .entry(alias.clone())
                    .or_default()
                    .insert(name.clone());
            }
            let zone = Zone {
                name: name.clone(),
                aliases: zone_aliases,
                device_types: hosted,
            };
            if zones.insert(name.clone(), zone).is_some() {
                return Err(CatalogError::Invalid {
                    reason: format!("zone {name} is defined twice"),
                });
            }
        }
        if let Some(clash) = aliases.keys().find(|a| zones.contains_key(*a)) {
            return Err(CatalogError::Invalid {
                reason: format!("alias {clash} is also a zone name"),
            });
        }

        let failed: BTreeSet<String> = failures.iter().map(|f| f.device_type.clone()).collect();
        let mut raw_schemas: BTreeMap<String, Vec<FieldDefinition>> = data
            .schemas
            .into_iter()
            .map(|(name, defs)| (name.to_lowercase(), defs))
            .collect();
        let mut schemas = BTreeMap::new();
        for (name, device_type) in &mut device_types {
            if failed.contains(name) {
                continue;
            }
            let Some(defs) = raw_schemas.remove(name.as_str()) else {
                failures.push(SchemaLoadError {
                    device_type: name.clone(),
                    reason: "no field schema".into(),
                });
                continue;
            };
            match FieldSchema::new(name, &device_type.identity_field, defs) {
                Ok(schema) => {
                    device_type.summary_fields.retain(|key| {
                        let known = schema.get(key).is_some();
                        if !known {
                            warn!(device_type = %name, field = %key, "unknown summary field, ignoring");
                        }
                        known
                    });
                    schemas.insert(name.clone(), schema);
                }
                Err(reason) => failures.push(SchemaLoadError {
                    device_type: name.clone(),
                    reason,
                }),
            }
        }

        for failure in &failures {
            warn!(device_type = %failure.device_type, reason = %failure.reason, "schema not loaded");
        }
        info!(
            %mode,
            zones = zones.len(),
            device_types = device_types.len(),
            schemas = schemas.len(),
            "catalog loaded"
        );

        Ok(Self {
            zones,
            aliases,
            device_types,
            schemas,
            failures,
            mode,
            requested: mode,
            loaded_at: Utc::now(),
            fallback_reason: None,
        })
    }

    /// Mark a local snapshot as standing in for a failed `requested` load.
    pub(crate) fn with_fallback(mut self, requested: CatalogMode, reason: String) -> Self {
        self.requested = requested;
        self.fallback_reason = Some(reason);
        self
    }

    // ── Metadata ────────────────────────────────────────────────────

    /// Where the data actually came from.
    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    /// The mode the snapshot was loaded for. Differs from `mode()` after
    /// a store-to-local fallback.
    pub fn requested_mode(&self) -> CatalogMode {
        self.requested
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Why store mode fell back to the local dataset, if it did.
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    /// Device types whose schema failed to load.
    pub fn failures(&self) -> &[SchemaLoadError] {
        &self.failures
    }

    /// Operator-facing notes about this snapshot: the fallback reason and
    /// every schema that failed to load.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .fallback_reason()
            .map(|reason| format!("Using the local catalog: {reason}"))
            .into_iter()
            .collect();
        warnings.extend(
            self.failures
                .iter()
                .map(|f| format!("Schema for {} not loaded: {}", f.device_type, f.reason)),
        );
        warnings
    }

    // ── Typed lookups ───────────────────────────────────────────────

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.get(&name.to_lowercase())
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn device_type(&self, name: &str) -> Option<&DeviceType> {
        self.device_types.get(&name.to_lowercase())
    }

    pub fn device_types(&self) -> impl Iterator<Item = &DeviceType> {
        self.device_types.values()
    }

    /// Field schema of a device type.
    pub fn schema(&self, device_type: &str) -> Result<&FieldSchema, CoreError> {
        let name = device_type.to_lowercase();
        if let Some(schema) = self.schemas.get(&name) {
            return Ok(schema);
        }
        let reason = self
            .failures
            .iter()
            .find(|f| f.device_type == name)
            .map_or_else(|| "unknown device type".to_owned(), |f| f.reason.clone());
        Err(CoreError::SchemaLoad {
            device_type: name,
            reason,
        })
    }

    pub fn identity_field(&self, device_type: &str) -> Result<&FieldDefinition, CoreError> {
        Ok(self.schema(device_type)?.identity_field())
    }

    /// Field keys of a device type selected by `selector`, in schema order.
    pub fn fields_where(
        &self,
        device_type: &str,
        selector: FieldSelector<'_>,
    ) -> Result<Vec<&str>, CoreError> {
        Ok(self.schema(device_type)?.select(selector))
    }

    // ── Listing accessors ───────────────────────────────────────────

    /// Canonical zone names, sorted.
    pub fn zone_names(&self) -> Vec<&str> {
        self.zones.keys().map(String::as_str).collect()
    }

    /// Every (zone, hosted device type) pair, sorted by zone then type.
    pub fn zone_type_pairs(&self) -> Vec<(&str, &str)> {
        self.zones
            .values()
            .flat_map(|z| {
                z.device_types
                    .iter()
                    .map(move |t| (z.name.as_str(), t.as_str()))
            })
            .collect()
    }

    /// Alias -> zone set table.
    pub fn aliases(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.aliases
    }
}
