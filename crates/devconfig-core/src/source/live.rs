// ── Live value source ──
//
// Reads every schema field of one device from its control points. The
// identity field goes first; if it cannot be read the device is unusable
// and the other reads are skipped. Remaining reads run concurrently and are
// put back into schema order.

use std::time::Duration;

use futures_util::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::{PointTransport, TransportError, ValueSource, translate};
use crate::error::CoreError;
use crate::model::{FieldDefinition, FieldSchema, FieldValueMap, NO_CON, ResolveIssue, SourceLabel};

/// Outcome of one field read.
struct FieldRead {
    value: String,
    issues: Vec<ResolveIssue>,
    reached: bool,
}

/// Live reads through a [`PointTransport`], each bounded by `read_timeout`.
#[derive(Debug)]
pub struct LiveSource<'a, P> {
    points: &'a P,
    read_timeout: Duration,
}

impl<'a, P: PointTransport> LiveSource<'a, P> {
    pub fn new(points: &'a P, read_timeout: Duration) -> Self {
        Self {
            points,
            read_timeout,
        }
    }

    /// Read only the identity field of the device at `address`.
    ///
    /// Fails with `IdentityUnreadable` when the point cannot be reached.
    pub async fn read_identity(
        &self,
        schema: &FieldSchema,
        address: &str,
    ) -> Result<(String, Vec<ResolveIssue>), CoreError> {
        let address = check_address(address)?;
        let identity = schema.identity_field();
        let read = self.read_field(identity, address).await;
        if read.reached {
            Ok((read.value, read.issues))
        } else {
            Err(CoreError::IdentityUnreadable {
                address: address.to_owned(),
                field: identity.key.clone(),
            })
        }
    }

    async fn read_field(&self, def: &FieldDefinition, base: &str) -> FieldRead {
        let address = def.address(base);
        let result = match tokio::time::timeout(self.read_timeout, self.points.get(&address)).await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                address: address.clone(),
                after_ms: self.read_timeout.as_millis(),
            }),
        };

        let mut issues = Vec::new();
        match result {
            Ok(raw) => FieldRead {
                value: translate(def, &raw, &mut issues),
                issues,
                reached: true,
            },
            Err(e) => {
                debug!(field = %def.key, error = %e, "point unreachable");
                issues.push(ResolveIssue::Unreachable {
                    field: def.key.clone(),
                    address,
                    reason: e.to_string(),
                });
                FieldRead {
                    value: NO_CON.to_owned(),
                    issues,
                    reached: false,
                }
            }
        }
    }
}

impl<P: PointTransport> ValueSource for LiveSource<'_, P> {
    async fn resolve(&self, schema: &FieldSchema, address: &str) -> Result<FieldValueMap, CoreError> {
        let address = check_address(address)?;
        let label = SourceLabel::Live {
            address: address.to_owned(),
        };
        let identity = schema.identity_field();
        let identity_read = self.read_field(identity, address).await;

        if !identity_read.reached {
            warn!(address, field = %identity.key, "identity unreadable, skipping remaining fields");
            let mut issues = identity_read.issues;
            issues.push(ResolveIssue::ShortCircuit {
                address: address.to_owned(),
                skipped: schema.len().saturating_sub(1),
            });
            let values = schema.keys().map(|k| (k.to_owned(), NO_CON.to_owned())).collect();
            return Ok(FieldValueMap::new(label, values, issues));
        }

        let others: Vec<&FieldDefinition> =
            schema.iter().filter(|def| def.key != identity.key).collect();
        let reads = join_all(others.iter().map(|def| self.read_field(def, address))).await;

        let mut by_key: IndexMap<&str, FieldRead> = others
            .iter()
            .map(|def| def.key.as_str())
            .zip(reads)
            .collect();
        by_key.insert(identity.key.as_str(), identity_read);

        let mut values = IndexMap::with_capacity(schema.len());
        let mut issues = Vec::new();
        for key in schema.keys() {
            if let Some(read) = by_key.swap_remove(key) {
                values.insert(key.to_owned(), read.value);
                issues.extend(read.issues);
            }
        }

        debug!(address, fields = values.len(), issues = issues.len(), "live read complete");
        Ok(FieldValueMap::new(label, values, issues))
    }
}

fn check_address(address: &str) -> Result<&str, CoreError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidAddress {
            address: address.to_owned(),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::future::Future;

    use super::*;
    use crate::model::{FieldScope, PointValue};
    use crate::source::MemoryPoints;

    fn def(key: &str, suffix: &str, scope: FieldScope) -> FieldDefinition {
        FieldDefinition {
            key: key.into(),
            alias: key.to_lowercase(),
            tooltip: String::new(),
            suffix: suffix.into(),
            enum_labels: None,
            scope,
        }
    }

    fn schema() -> FieldSchema {
        let mut power = def("FLD_PWR", ":PWR", FieldScope::Config);
        power.enum_labels = Some(vec!["OFF".into(), "ON".into()]);
        FieldSchema::new(
            "ims_motor",
            "FLD_SN",
            vec![
                def("FLD_DESC", ".DESC", FieldScope::Config),
                def("FLD_SN", ":SN", FieldScope::Object),
                def("FLD_PORT", ":PORT", FieldScope::Object),
                power,
            ],
        )
        .unwrap()
    }

    fn motor(base: &str, sn: &str) -> MemoryPoints {
        MemoryPoints::default()
            .with(&format!("{base}.DESC"), "M1")
            .with(&format!("{base}:SN"), sn)
            .with(&format!("{base}:PORT"), 3_i64)
            .with(&format!("{base}:PWR"), 1_i64)
    }

    /// Transport whose listed addresses never answer.
    struct Hanging {
        inner: MemoryPoints,
        hung: HashSet<String>,
    }

    impl PointTransport for Hanging {
        fn get(
            &self,
            address: &str,
        ) -> impl Future<Output = Result<PointValue, TransportError>> + Send {
            let hang = self.hung.contains(address);
            let result = self.inner.lookup(address);
            async move {
                if hang {
                    std::future::pending::<()>().await;
                }
                result
            }
        }
    }

    #[tokio::test]
    async fn resolves_in_schema_order_with_labels() {
        let points = motor("SXR:MMS:01", "SN1");
        let live = LiveSource::new(&points, Duration::from_secs(1));
        let map = live.resolve(&schema(), "SXR:MMS:01").await.unwrap();

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(
            entries,
            [
                ("FLD_DESC", "M1"),
                ("FLD_SN", "SN1"),
                ("FLD_PORT", "3"),
                ("FLD_PWR", "ON"),
            ]
        );
        assert!(map.issues().is_empty());
        assert_eq!(map.source().to_string(), "SXR:MMS:01");
    }

    #[tokio::test]
    async fn out_of_range_enum_falls_back_with_issue() {
        let points = motor("SXR:MMS:01", "SN1").with("SXR:MMS:01:PWR", 5_i64);
        let live = LiveSource::new(&points, Duration::from_secs(1));
        let map = live.resolve(&schema(), "SXR:MMS:01").await.unwrap();

        assert_eq!(map.get("FLD_PWR"), Some("OFF"));
        assert!(matches!(
            map.issues(),
            [ResolveIssue::EnumOutOfRange { field, .. }] if field == "FLD_PWR"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_field_is_no_con_and_others_still_resolve() {
        let points = Hanging {
            inner: motor("SXR:MMS:01", "SN1"),
            hung: HashSet::from(["SXR:MMS:01:PORT".to_owned()]),
        };
        let live = LiveSource::new(&points, Duration::from_millis(200));
        let map = live.resolve(&schema(), "SXR:MMS:01").await.unwrap();

        assert_eq!(map.get("FLD_PORT"), Some(NO_CON));
        assert_eq!(map.get("FLD_DESC"), Some("M1"));
        assert_eq!(map.get("FLD_PWR"), Some("ON"));
        assert!(matches!(
            map.issues(),
            [ResolveIssue::Unreachable { field, .. }] if field == "FLD_PORT"
        ));
    }

    #[tokio::test]
    async fn unreachable_identity_short_circuits() {
        let points = MemoryPoints::default().with("SXR:MMS:01.DESC", "M1");
        let live = LiveSource::new(&points, Duration::from_secs(1));
        let map = live.resolve(&schema(), "SXR:MMS:01").await.unwrap();

        assert!(map.iter().all(|(_, v)| v == NO_CON));
        assert_eq!(map.len(), 4);
        assert!(map.issues().iter().any(|i| matches!(
            i,
            ResolveIssue::ShortCircuit { skipped: 3, .. }
        )));
    }

    #[tokio::test]
    async fn blank_address_is_rejected() {
        let points = MemoryPoints::default();
        let live = LiveSource::new(&points, Duration::from_secs(1));
        let err = live.resolve(&schema(), "  ").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn read_identity_fails_when_unreachable() {
        let points = MemoryPoints::default();
        let live = LiveSource::new(&points, Duration::from_secs(1));
        let err = live.read_identity(&schema(), "SXR:MMS:01").await.unwrap_err();
        assert!(matches!(err, CoreError::IdentityUnreadable { field, .. } if field == "FLD_SN"));
    }
}
