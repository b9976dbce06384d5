// ── Stored value source ──
//
// Resolves a device's fields from the configuration store. The device is
// located by its identity value, which is read live first; each field then
// comes from the linked configuration record, falling back to the object
// record for object-scoped fields.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::{ConfigStore, LiveSource, ObjectRecord, PointTransport, ValueSource, translate};
use crate::error::CoreError;
use crate::model::{FieldSchema, FieldValueMap, ResolveIssue, SourceLabel};

/// Configuration-store lookups keyed by a live identity read.
#[derive(Debug)]
pub struct StoredSource<'a, P, S> {
    live: LiveSource<'a, P>,
    store: &'a S,
    strict: bool,
}

impl<'a, P: PointTransport, S: ConfigStore> StoredSource<'a, P, S> {
    /// `strict` turns a field missing from both stored records into an
    /// error instead of a recorded issue.
    pub fn new(live: LiveSource<'a, P>, store: &'a S, strict: bool) -> Self {
        Self {
            live,
            store,
            strict,
        }
    }

    /// Resolve the stored record of the device whose identity field equals
    /// `identity`, without touching the device.
    pub async fn resolve_identity(
        &self,
        schema: &FieldSchema,
        identity: &str,
    ) -> Result<FieldValueMap, CoreError> {
        let record = self.lookup(schema, identity).await?;
        self.build(schema, identity, &record, Vec::new())
    }

    async fn lookup(&self, schema: &FieldSchema, identity: &str) -> Result<ObjectRecord, CoreError> {
        debug!(device_type = schema.device_type(), identity, "store lookup");
        self.store
            .find_object_by_identity(schema.device_type(), schema.identity_key(), identity)
            .await?
            .ok_or_else(|| CoreError::NotFoundInStore {
                device_type: schema.device_type().to_owned(),
                identity_field: schema.identity_key().to_owned(),
                value: identity.to_owned(),
            })
    }

    fn build(
        &self,
        schema: &FieldSchema,
        identity: &str,
        record: &ObjectRecord,
        mut issues: Vec<ResolveIssue>,
    ) -> Result<FieldValueMap, CoreError> {
        let mut values = IndexMap::with_capacity(schema.len());
        for def in schema.iter() {
            let value = match record.value(&def.key) {
                Some(raw) => translate(def, raw, &mut issues),
                None if self.strict => {
                    return Err(CoreError::SchemaMismatch {
                        field: def.key.clone(),
                    });
                }
                None => {
                    warn!(field = %def.key, object = %record.name, "field missing from stored records");
                    issues.push(ResolveIssue::SchemaMismatch {
                        field: def.key.clone(),
                    });
                    String::new()
                }
            };
            values.insert(def.key.clone(), value);
        }

        let source = SourceLabel::Stored {
            identity: identity.to_owned(),
        };
        Ok(FieldValueMap::new(source, values, issues))
    }
}

impl<P: PointTransport, S: ConfigStore> ValueSource for StoredSource<'_, P, S> {
    async fn resolve(&self, schema: &FieldSchema, address: &str) -> Result<FieldValueMap, CoreError> {
        let (identity, issues) = self.live.read_identity(schema, address).await?;
        let record = self.lookup(schema, &identity).await?;
        self.build(schema, &identity, &record, issues)
    }
}
