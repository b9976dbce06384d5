// ── In-memory collaborators ──
//
// Snapshot-backed transport and store. The CLI loads them from JSON files
// for offline use (`--points-file`, `--store-file`); tests build them
// directly.
//
// Points file:  { "SXR:MMS:01:SN": "SN1", "SXR:MMS:01:PORT": 3, ... }
//               (`null` marks a disconnected point)
// Store file:   { "objects": { "<type>": [ { "name", "fields", "config" } ] },
//                 "catalog": { ...same shape as the store's catalog endpoint } }

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use devconfig_api::models::CatalogDocument;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::{ConfigRecord, ConfigStore, ObjectRecord, PointTransport, StoreError, TransportError};
use crate::catalog::CatalogData;
use crate::convert;
use crate::model::PointValue;

/// A snapshot file could not be loaded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, SnapshotError> {
    let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| SnapshotError::Parse {
        path: path.to_owned(),
        message: e.to_string(),
    })
}

// ── Points ──────────────────────────────────────────────────────────

/// Control-point values held in memory. `None` marks a disconnected point.
#[derive(Debug, Clone, Default)]
pub struct MemoryPoints {
    values: HashMap<String, Option<PointValue>>,
}

impl MemoryPoints {
    pub fn from_json_file(path: &Path) -> Result<Self, SnapshotError> {
        let raw: HashMap<String, Value> = read_json(path)?;
        let values = raw
            .into_iter()
            .map(|(address, value)| {
                let value = (!value.is_null()).then(|| PointValue::from(value));
                (address, value)
            })
            .collect();
        Ok(Self { values })
    }

    /// Builder-style insert, replacing any existing value.
    pub fn with(mut self, address: &str, value: impl Into<PointValue>) -> Self {
        self.values.insert(address.to_owned(), Some(value.into()));
        self
    }

    /// Mark a point as present but disconnected.
    pub fn with_disconnected(mut self, address: &str) -> Self {
        self.values.insert(address.to_owned(), None);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn lookup(&self, address: &str) -> Result<PointValue, TransportError> {
        match self.values.get(address) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(TransportError::Connection {
                address: address.to_owned(),
                reason: "disconnected".into(),
            }),
            None => Err(TransportError::Connection {
                address: address.to_owned(),
                reason: "no such point".into(),
            }),
        }
    }
}

impl PointTransport for MemoryPoints {
    async fn get(&self, address: &str) -> Result<PointValue, TransportError> {
        self.lookup(address)
    }
}

// ── Store ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StoreFile {
    #[serde(default)]
    objects: BTreeMap<String, Vec<ObjectEntry>>,
    #[serde(default)]
    catalog: Option<CatalogDocument>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, PointValue>,
    #[serde(default)]
    config: Option<ConfigEntry>,
}

#[derive(Debug, Deserialize)]
struct ConfigEntry {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, PointValue>,
}

/// Configuration-store records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, Vec<ObjectRecord>>,
    catalog: Option<CatalogData>,
}

impl MemoryStore {
    pub fn from_json_file(path: &Path) -> Result<Self, SnapshotError> {
        let file: StoreFile = read_json(path)?;
        let objects = file
            .objects
            .into_iter()
            .map(|(device_type, entries)| {
                let records = entries
                    .into_iter()
                    .map(|e| ObjectRecord {
                        name: e.name,
                        fields: e.fields,
                        config: e.config.map(|c| ConfigRecord {
                            name: c.name,
                            fields: c.fields,
                        }),
                    })
                    .collect();
                (device_type, records)
            })
            .collect();
        Ok(Self {
            objects,
            catalog: file.catalog.map(convert::catalog_data),
        })
    }

    pub fn with_object(mut self, device_type: &str, record: ObjectRecord) -> Self {
        self.objects
            .entry(device_type.to_owned())
            .or_default()
            .push(record);
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogData) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

impl ConfigStore for MemoryStore {
    async fn find_object_by_identity(
        &self,
        device_type: &str,
        identity_key: &str,
        value: &str,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        let found = self.objects.get(device_type).and_then(|records| {
            records.iter().find(|r| {
                r.fields
                    .get(identity_key)
                    .is_some_and(|v| v.to_string() == value)
            })
        });
        Ok(found.cloned())
    }

    async fn catalog(&self) -> Result<CatalogData, StoreError> {
        self.catalog.clone().ok_or_else(|| StoreError::Unavailable {
            reason: "store snapshot carries no catalog".into(),
        })
    }
}
