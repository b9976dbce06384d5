// ── Local catalog dataset ──
//
// Layout of a dataset directory:
//
//   catalog.toml            [[zones]] and [[device_types]] tables
//   schemas/<type>.toml     [[fields]] of one device type, in order
//
// A missing or unparsable `catalog.toml` fails the whole load. Schema files
// are read per type; a broken one becomes a load failure for that type.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{CatalogData, CatalogError, DeviceTypeData, SchemaLoadError, ZoneData};
use crate::model::FieldDefinition;

/// Name of the top-level catalog file inside a dataset directory.
pub const CATALOG_FILE: &str = "catalog.toml";
/// Subdirectory holding one schema file per device type.
pub const SCHEMA_DIR: &str = "schemas";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    zones: Vec<ZoneData>,
    #[serde(default)]
    device_types: Vec<DeviceTypeData>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    fields: Vec<FieldDefinition>,
}

/// Catalog dataset stored as TOML files in one directory.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    dir: PathBuf,
}

impl LocalCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the schema file for `device_type`.
    pub fn schema_path(&self, device_type: &str) -> PathBuf {
        self.dir
            .join(SCHEMA_DIR)
            .join(format!("{}.toml", device_type.to_lowercase()))
    }

    /// Read the dataset.
    pub fn read(&self) -> Result<CatalogData, CatalogError> {
        let path = self.dir.join(CATALOG_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let file: CatalogFile = toml::from_str(&text).map_err(|e| CatalogError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut data = CatalogData {
            zones: file.zones,
            device_types: file.device_types,
            ..CatalogData::default()
        };

        for device_type in &data.device_types {
            let name = device_type.name.to_lowercase();
            match self.read_schema(&name) {
                Ok(fields) => {
                    debug!(device_type = %name, fields = fields.len(), "schema file read");
                    data.schemas.insert(name, fields);
                }
                Err(reason) => data.load_failures.push(SchemaLoadError {
                    device_type: name,
                    reason,
                }),
            }
        }

        Ok(data)
    }

    fn read_schema(&self, device_type: &str) -> Result<Vec<FieldDefinition>, String> {
        let path = self.schema_path(device_type);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let file: SchemaFile = toml::from_str(&text)
            .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
        Ok(file.fields)
    }
}
