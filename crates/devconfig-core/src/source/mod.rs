// ── Value sources and their collaborators ──
//
// `LiveSource` and `StoredSource` both turn a field schema plus a target
// into a `FieldValueMap`. They are generic over the two collaborator traits
// below, so tests run against in-memory backends and the CLI against the
// HTTP clients.

use std::collections::BTreeMap;
use std::future::Future;

use thiserror::Error;
use tracing::warn;

use crate::catalog::CatalogData;
use crate::error::CoreError;
use crate::model::{FieldDefinition, FieldSchema, FieldValueMap, PointValue, ResolveIssue};

pub mod live;
pub mod memory;
mod remote;
pub mod stored;

pub use live::LiveSource;
pub use memory::{MemoryPoints, MemoryStore, SnapshotError};
pub use stored::StoredSource;

// ── Collaborator errors ─────────────────────────────────────────────

/// A single control-point read failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{address}: {reason}")]
    Connection { address: String, reason: String },

    #[error("{address}: no answer within {after_ms} ms")]
    Timeout { address: String, after_ms: u128 },
}

/// The configuration store could not answer a request.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Configuration store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Configuration store rejected the request: {message}")]
    Rejected { message: String },

    #[error("Malformed configuration store data: {message}")]
    Malformed { message: String },
}

// ── Collaborator records ────────────────────────────────────────────

/// Logical configuration record linked from a store object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigRecord {
    pub name: String,
    pub fields: BTreeMap<String, PointValue>,
}

/// Physical-device record found in the configuration store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRecord {
    pub name: String,
    pub fields: BTreeMap<String, PointValue>,
    pub config: Option<ConfigRecord>,
}

impl ObjectRecord {
    /// Stored value of a field, preferring the linked configuration.
    pub fn value(&self, key: &str) -> Option<&PointValue> {
        self.config
            .as_ref()
            .and_then(|cfg| cfg.fields.get(key))
            .or_else(|| self.fields.get(key))
    }
}

// ── Collaborator traits ─────────────────────────────────────────────

/// Get-by-address access to control points.
pub trait PointTransport: Send + Sync {
    fn get(&self, address: &str) -> impl Future<Output = Result<PointValue, TransportError>> + Send;
}

/// Lookup access to the configuration store.
pub trait ConfigStore: Send + Sync {
    /// Find the object of `device_type` whose `identity_key` field equals
    /// `value`, with its linked configuration resolved.
    fn find_object_by_identity(
        &self,
        device_type: &str,
        identity_key: &str,
        value: &str,
    ) -> impl Future<Output = Result<Option<ObjectRecord>, StoreError>> + Send;

    /// The devconfig catalog kept in the store.
    fn catalog(&self) -> impl Future<Output = Result<CatalogData, StoreError>> + Send;
}

/// Store used when no configuration store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl ConfigStore for NoStore {
    async fn find_object_by_identity(
        &self,
        _device_type: &str,
        _identity_key: &str,
        _value: &str,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        Err(StoreError::Unavailable {
            reason: "no configuration store configured".into(),
        })
    }

    async fn catalog(&self) -> Result<CatalogData, StoreError> {
        Err(StoreError::Unavailable {
            reason: "no configuration store configured".into(),
        })
    }
}

/// Resolve a field schema against one target into a value map.
pub trait ValueSource {
    fn resolve(
        &self,
        schema: &FieldSchema,
        target: &str,
    ) -> impl Future<Output = Result<FieldValueMap, CoreError>> + Send;
}

// ── Enumeration translation ─────────────────────────────────────────

/// Render a raw value for display, applying the field's enumeration table.
///
/// A value that already equals one of the labels passes through. Anything
/// else is taken as an index; an index outside the table falls back to the
/// first label and records an `EnumOutOfRange` issue.
pub(crate) fn translate(
    def: &FieldDefinition,
    raw: &PointValue,
    issues: &mut Vec<ResolveIssue>,
) -> String {
    let Some(labels) = def.enum_labels.as_deref() else {
        return raw.to_string();
    };

    if let PointValue::Text(text) = raw {
        if labels.iter().any(|l| l == text) {
            return text.clone();
        }
    }

    if let Some(label) = raw.as_index().and_then(|i| labels.get(i)) {
        return label.clone();
    }

    warn!(field = %def.key, raw = %raw, "device and stored enumeration are out of sync");
    issues.push(ResolveIssue::EnumOutOfRange {
        field: def.key.clone(),
        raw: raw.to_string(),
    });
    labels.first().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldScope;

    fn power() -> FieldDefinition {
        FieldDefinition {
            key: "FLD_PWR".into(),
            alias: "Power".into(),
            tooltip: String::new(),
            suffix: ".PWR".into(),
            enum_labels: Some(vec!["OFF".into(), "ON".into()]),
            scope: FieldScope::Config,
        }
    }

    #[test]
    fn enum_index_maps_to_label() {
        let mut issues = Vec::new();
        assert_eq!(translate(&power(), &PointValue::Int(1), &mut issues), "ON");
        assert_eq!(translate(&power(), &PointValue::from("0"), &mut issues), "OFF");
        assert!(issues.is_empty());
    }

    #[test]
    fn enum_out_of_range_falls_back_to_first_label() {
        let mut issues = Vec::new();
        assert_eq!(translate(&power(), &PointValue::Int(5), &mut issues), "OFF");
        assert_eq!(
            issues,
            vec![ResolveIssue::EnumOutOfRange {
                field: "FLD_PWR".into(),
                raw: "5".into(),
            }]
        );
    }

    #[test]
    fn label_text_passes_through() {
        let mut issues = Vec::new();
        assert_eq!(translate(&power(), &PointValue::from("ON"), &mut issues), "ON");
        assert!(issues.is_empty());
    }

    #[test]
    fn plain_fields_are_displayed_as_is() {
        let mut def = power();
        def.enum_labels = None;
        let mut issues = Vec::new();
        assert_eq!(translate(&def, &PointValue::Float(2.5), &mut issues), "2.5");
        assert_eq!(translate(&def, &PointValue::Empty, &mut issues), "");
    }

    #[test]
    fn stored_value_prefers_config() {
        let record = ObjectRecord {
            name: "m1".into(),
            fields: BTreeMap::from([
                ("FLD_SN".into(), PointValue::from("SN1")),
                ("FLD_DESC".into(), PointValue::from("object desc")),
            ]),
            config: Some(ConfigRecord {
                name: "cfg".into(),
                fields: BTreeMap::from([("FLD_DESC".into(), PointValue::from("config desc"))]),
            }),
        };
        assert_eq!(record.value("FLD_DESC"), Some(&PointValue::from("config desc")));
        assert_eq!(record.value("FLD_SN"), Some(&PointValue::from("SN1")));
        assert_eq!(record.value("FLD_PORT"), None);
    }
}
