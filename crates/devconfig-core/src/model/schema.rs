// ── Field schema types ──
//
// A `FieldSchema` is the ordered field map of one device type. Field order
// is declaration order and is preserved everywhere values are resolved.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether a field belongs to the physical object or the shared
/// logical configuration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldScope {
    /// Physical / identity data (serial number, port, ...).
    Object,
    /// Logical configuration shared between devices.
    #[default]
    Config,
}

/// One entry of a field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub alias: String,
    #[serde(default)]
    pub tooltip: String,
    /// Appended to a device base address to read this field.
    pub suffix: String,
    /// Index -> label table for enumerated fields.
    #[serde(default)]
    pub enum_labels: Option<Vec<String>>,
    #[serde(default)]
    pub scope: FieldScope,
}

impl FieldDefinition {
    pub fn is_object(&self) -> bool {
        self.scope == FieldScope::Object
    }

    /// Full control-point address of this field on a device.
    pub fn address(&self, base: &str) -> String {
        format!("{base}{}", self.suffix)
    }

    /// Alias for display, falling back to the key.
    pub fn display_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.key
        } else {
            &self.alias
        }
    }
}

/// Named field subsets used by listings and summary views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector<'a> {
    All,
    Object,
    Config,
    Summary(&'a [String]),
}

/// The ordered field map of one device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    device_type: String,
    identity: String,
    fields: IndexMap<String, FieldDefinition>,
}

impl FieldSchema {
    /// Build and validate a schema.
    ///
    /// Rejects duplicate keys, empty enumeration tables, and an identity
    /// field that is missing or not object-scoped.
    pub fn new(
        device_type: &str,
        identity: &str,
        definitions: Vec<FieldDefinition>,
    ) -> Result<Self, String> {
        let mut fields = IndexMap::with_capacity(definitions.len());
        for def in definitions {
            if def.key.is_empty() {
                return Err("field with an empty key".into());
            }
            if def.enum_labels.as_ref().is_some_and(Vec::is_empty) {
                return Err(format!("field {} has an empty enumeration table", def.key));
            }
            if let Some(prev) = fields.insert(def.key.clone(), def) {
                return Err(format!("duplicate field {}", prev.key));
            }
        }

        match fields.get(identity) {
            None => Err(format!("identity field {identity} is not in the schema")),
            Some(def) if !def.is_object() => {
                Err(format!("identity field {identity} must be object-scoped"))
            }
            Some(_) => Ok(Self {
                device_type: device_type.to_owned(),
                identity: identity.to_owned(),
                fields,
            }),
        }
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    pub fn identity_key(&self) -> &str {
        &self.identity
    }

    pub fn identity_field(&self) -> &FieldDefinition {
        // Presence is checked in `new`.
        &self.fields[self.identity.as_str()]
    }

    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys of the fields matching `predicate`, in schema order.
    pub fn fields_where(&self, predicate: impl Fn(&FieldDefinition) -> bool) -> Vec<&str> {
        self.fields
            .values()
            .filter(|def| predicate(def))
            .map(|def| def.key.as_str())
            .collect()
    }

    /// Keys selected by a named subset, in schema order.
    pub fn select(&self, selector: FieldSelector<'_>) -> Vec<&str> {
        match selector {
            FieldSelector::All => self.fields_where(|_| true),
            FieldSelector::Object => self.fields_where(FieldDefinition::is_object),
            FieldSelector::Config => self.fields_where(|def| !def.is_object()),
            FieldSelector::Summary(keys) => self.fields_where(|def| keys.contains(&def.key)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn field(key: &str, scope: FieldScope) -> FieldDefinition {
        FieldDefinition {
            key: key.into(),
            alias: String::new(),
            tooltip: String::new(),
            suffix: format!(".{key}"),
            enum_labels: None,
            scope,
        }
    }

    fn motor() -> FieldSchema {
        FieldSchema::new(
            "ims_motor",
            "FLD_SN",
            vec![
                field("FLD_DESC", FieldScope::Config),
                field("FLD_SN", FieldScope::Object),
                field("FLD_PORT", FieldScope::Object),
                field("FLD_EE", FieldScope::Config),
            ],
        )
        .unwrap()
    }

    #[test]
    fn preserves_declaration_order() {
        let schema = motor();
        let keys: Vec<_> = schema.keys().collect();
        assert_eq!(keys, ["FLD_DESC", "FLD_SN", "FLD_PORT", "FLD_EE"]);
    }

    #[test]
    fn identity_is_an_object_field() {
        let schema = motor();
        let object = schema.select(FieldSelector::Object);
        assert!(object.contains(&schema.identity_field().key.as_str()));
        assert_eq!(object, ["FLD_SN", "FLD_PORT"]);
        assert_eq!(schema.select(FieldSelector::Config), ["FLD_DESC", "FLD_EE"]);
    }

    #[test]
    fn summary_selection_keeps_schema_order() {
        let schema = motor();
        let summary = vec!["FLD_PORT".to_owned(), "FLD_DESC".to_owned()];
        assert_eq!(
            schema.select(FieldSelector::Summary(&summary)),
            ["FLD_DESC", "FLD_PORT"]
        );
    }

    #[test]
    fn rejects_missing_identity() {
        let err = FieldSchema::new("ims_motor", "FLD_SN", vec![field("FLD_DESC", FieldScope::Config)])
            .unwrap_err();
        assert!(err.contains("FLD_SN"));
    }

    #[test]
    fn rejects_config_scoped_identity() {
        let err = FieldSchema::new("ims_motor", "FLD_SN", vec![field("FLD_SN", FieldScope::Config)])
            .unwrap_err();
        assert!(err.contains("object-scoped"));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = FieldSchema::new(
            "ims_motor",
            "FLD_SN",
            vec![field("FLD_SN", FieldScope::Object), field("FLD_SN", FieldScope::Object)],
        )
        .unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn display_name_falls_back_to_key() {
        let mut def = field("FLD_SN", FieldScope::Object);
        assert_eq!(def.display_name(), "FLD_SN");
        def.alias = "Serial".into();
        assert_eq!(def.display_name(), "Serial");
        assert_eq!(def.address("SXR:MMS:01"), "SXR:MMS:01.FLD_SN");
    }
}
