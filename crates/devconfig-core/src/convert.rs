// ── Wire model -> domain conversions ──

use std::collections::{BTreeMap, HashMap};

use devconfig_api::models::{CatalogDocument, FieldRecord, StoreConfig, StoreObject};
use serde_json::Value;

use crate::catalog::{CatalogData, DeviceTypeData, ZoneData};
use crate::model::{FieldDefinition, FieldScope, PointValue};
use crate::source::{ConfigRecord, ObjectRecord};

pub(crate) fn catalog_data(doc: CatalogDocument) -> CatalogData {
    let zones = doc
        .hutches
        .into_iter()
        .map(|h| ZoneData {
            name: h.name,
            aliases: h.aliases,
            device_types: h.obj_types,
        })
        .collect();

    let device_types = doc
        .obj_types
        .into_iter()
        .map(|t| DeviceTypeData {
            name: t.name,
            display_name: t.display_name,
            identity_field: t.id_field,
            summary_fields: t.summary,
            log_level: t.log_level,
        })
        .collect();

    let schemas = doc
        .fld_maps
        .into_iter()
        .map(|(name, fields)| (name, fields.into_iter().map(field_definition).collect()))
        .collect();

    CatalogData {
        zones,
        device_types,
        schemas,
        load_failures: Vec::new(),
    }
}

fn field_definition(record: FieldRecord) -> FieldDefinition {
    FieldDefinition {
        key: record.fld,
        alias: record.alias,
        tooltip: record.tooltip,
        suffix: record.pv,
        enum_labels: record.enums,
        scope: if record.obj {
            FieldScope::Object
        } else {
            FieldScope::Config
        },
    }
}

fn point_values(fields: HashMap<String, Value>) -> BTreeMap<String, PointValue> {
    fields
        .into_iter()
        .map(|(k, v)| (k, PointValue::from(v)))
        .collect()
}

pub(crate) fn object_record(object: StoreObject, config: Option<StoreConfig>) -> ObjectRecord {
    ObjectRecord {
        name: object.name,
        fields: point_values(object.fields),
        config: config.map(|c| ConfigRecord {
            name: c.name,
            fields: point_values(c.fields),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn catalog_document_maps_to_catalog_data() {
        let doc: CatalogDocument = serde_json::from_value(json!({
            "hutches": [{"name": "sxr", "aliases": ["sxd"], "obj_types": ["ims_motor"]}],
            "obj_types": [{"name": "ims_motor", "id_field": "FLD_SN", "log_level": "INFO"}],
            "fld_maps": {"ims_motor": [
                {"fld": "FLD_SN", "alias": "sn", "pv": ":SN", "obj": true},
                {"fld": "FLD_PWR", "pv": ":PWR", "enums": ["OFF", "ON"]}
            ]}
        }))
        .unwrap();

        let data = catalog_data(doc);
        assert_eq!(data.zones[0].aliases, ["sxd"]);
        assert_eq!(data.device_types[0].identity_field, "FLD_SN");
        let fields = &data.schemas["ims_motor"];
        assert_eq!(fields[0].scope, FieldScope::Object);
        assert_eq!(fields[0].suffix, ":SN");
        assert_eq!(fields[1].scope, FieldScope::Config);
        assert!(fields[1].enum_labels.is_some());
    }

    #[test]
    fn object_and_config_are_merged_into_one_record() {
        let object: StoreObject = serde_json::from_value(json!({
            "id": 7, "name": "sxr_m1", "config": 2,
            "fields": {"FLD_SN": "SN1", "FLD_PORT": 3}
        }))
        .unwrap();
        let config: StoreConfig = serde_json::from_value(json!({
            "id": 2, "name": "sxr_motor", "fields": {"FLD_DESC": "M1"}
        }))
        .unwrap();

        let record = object_record(object, Some(config));
        assert_eq!(record.value("FLD_PORT"), Some(&PointValue::Int(3)));
        assert_eq!(record.value("FLD_DESC"), Some(&PointValue::from("M1")));
        assert_eq!(record.config.unwrap().name, "sxr_motor");
    }
}
