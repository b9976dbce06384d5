// ── Engine facade ──
//
// Wires resolver, catalog, value sources, diff and renderer into the two
// operations the CLI needs: `diff` and `view`. The catalog snapshot lives
// behind an `ArcSwap`; `refresh` swaps it and readers keep whatever
// snapshot they already loaded.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, LocalCatalog, StoreCatalog, load_catalog};
use crate::config::{CatalogMode, EngineConfig};
use crate::diff::compute_diff;
use crate::error::CoreError;
use crate::model::{FieldSchema, FieldSelector, FieldValueMap, NO_CON};
use crate::render::{RenderOptions, render_diff, render_view};
use crate::resolve::{infer_device_type, resolve_device_types, resolve_zones};
use crate::source::{ConfigStore, LiveSource, PointTransport, StoredSource, ValueSource};

// ── Request / response types ────────────────────────────────────────

/// Options for [`Engine::diff`].
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Zone names or aliases restricting type inference.
    pub zones: Vec<String>,
    /// Device type names restricting type inference.
    pub device_types: Vec<String>,
    /// Reload the catalog in this mode first if it differs from the
    /// current snapshot's.
    pub mode: Option<CatalogMode>,
    /// Add the stored record of every device as an extra source.
    pub compare_against_store: bool,
    pub show_tooltip: bool,
}

/// What [`Engine::view`] shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewTarget {
    /// Live values of the device at this base address.
    Address(String),
    /// Stored values of the device whose identity field has this value.
    Identity { device_type: String, value: String },
}

/// Options for [`Engine::view`].
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Only the type's summary fields (object fields if it has none).
    pub summary_only: bool,
    pub show_tooltip: bool,
    pub zones: Vec<String>,
    pub device_types: Vec<String>,
    pub mode: Option<CatalogMode>,
}

/// Result of a diff or view.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub device_type: String,
    /// Rendered, aligned text.
    pub text: String,
    /// Diffing keys for a diff, shown keys for a view.
    pub keys: Vec<String>,
    pub maps: Vec<FieldValueMap>,
    /// Partial failures: ignored tokens, unreadable fields, and the like.
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ── Engine ──────────────────────────────────────────────────────────

/// Reconciliation engine over a point transport and a configuration store.
pub struct Engine<P, S> {
    config: EngineConfig,
    points: P,
    store: S,
    local: LocalCatalog,
    catalog: ArcSwap<Catalog>,
}

impl<P: PointTransport, S: ConfigStore> Engine<P, S> {
    /// Load the catalog for `config.mode` and build the engine.
    pub async fn open(config: EngineConfig, points: P, store: S) -> Result<Self, CoreError> {
        let local = LocalCatalog::new(&config.catalog_dir);
        let catalog = load_catalog(config.mode, &StoreCatalog::new(&store), &local).await?;
        Ok(Self::with_catalog(config, points, store, catalog))
    }

    /// Build the engine around an already loaded catalog.
    pub fn with_catalog(config: EngineConfig, points: P, store: S, catalog: Catalog) -> Self {
        Self {
            local: LocalCatalog::new(&config.catalog_dir),
            config,
            points,
            store,
            catalog: ArcSwap::from_pointee(catalog),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn points(&self) -> &P {
        &self.points
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.load_full()
    }

    /// Reload the catalog in `mode` and swap it in.
    pub async fn refresh(&self, mode: CatalogMode) -> Result<Arc<Catalog>, CoreError> {
        let catalog =
            Arc::new(load_catalog(mode, &StoreCatalog::new(&self.store), &self.local).await?);
        self.catalog.store(Arc::clone(&catalog));
        info!(mode = %catalog.mode(), "catalog refreshed");
        Ok(catalog)
    }

    /// Compare the live state of `addresses`, optionally against the store.
    pub async fn diff<A: AsRef<str>>(
        &self,
        addresses: &[A],
        options: &DiffOptions,
    ) -> Result<Report, CoreError> {
        let addresses: Vec<&str> = addresses.iter().map(|a| a.as_ref().trim()).collect();
        if addresses.is_empty() || (addresses.len() < 2 && !options.compare_against_store) {
            return Err(CoreError::InsufficientSources {
                found: addresses.len(),
            });
        }

        let catalog = self.catalog_for(options.mode).await?;
        let mut warnings = catalog.warnings();
        let (zones, types) =
            resolve_filters(&catalog, &options.zones, &options.device_types, &mut warnings)?;

        let mut inferred = BTreeSet::new();
        for address in &addresses {
            inferred.insert(infer_device_type(&catalog, address, zones.as_ref(), types.as_ref())?);
        }
        let device_type = single_type(inferred)?;
        let schema = catalog.schema(&device_type)?;
        debug!(%device_type, addresses = addresses.len(), "diffing");

        let live = self.live();
        let mut maps = join_all(addresses.iter().map(|a| live.resolve(schema, a)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        if options.compare_against_store {
            let stored = self.stored();
            let mut seen = BTreeSet::new();
            let mut identities = Vec::new();
            for (map, address) in maps.iter().zip(&addresses) {
                let identity = map.get(schema.identity_key()).unwrap_or(NO_CON);
                if identity == NO_CON {
                    return Err(CoreError::IdentityUnreadable {
                        address: (*address).to_owned(),
                        field: schema.identity_key().to_owned(),
                    });
                }
                if seen.insert(identity.to_owned()) {
                    identities.push(identity.to_owned());
                }
            }
            let stored_maps = join_all(identities.iter().map(|id| stored.resolve_identity(schema, id)))
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;
            maps.extend(stored_maps);
        }

        collect_issues(&maps, &mut warnings);
        let labels: Vec<String> = addresses.iter().map(|a| (*a).to_owned()).collect();
        let diff = compute_diff(maps, self.config.diff_order)?;
        let text = render_diff(&diff, schema, &labels, &self.render_options(options.show_tooltip));
        let (keys, maps) = diff.into_parts();

        Ok(Report {
            device_type,
            text,
            keys,
            maps,
            warnings,
            generated_at: Utc::now(),
        })
    }

    /// Show one device's live or stored values.
    pub async fn view(&self, target: &ViewTarget, options: &ViewOptions) -> Result<Report, CoreError> {
        let catalog = self.catalog_for(options.mode).await?;
        let mut warnings = catalog.warnings();
        let (zones, types) =
            resolve_filters(&catalog, &options.zones, &options.device_types, &mut warnings)?;

        let (device_type, map) = match target {
            ViewTarget::Address(address) => {
                let device_type =
                    infer_device_type(&catalog, address, zones.as_ref(), types.as_ref())?;
                let schema = catalog.schema(&device_type)?;
                let map = self.live().resolve(schema, address).await?;
                (device_type, map)
            }
            ViewTarget::Identity { device_type, value } => {
                let resolved = resolve_device_types(&catalog, std::slice::from_ref(device_type))?;
                let device_type = single_type(resolved.valid)?;
                let schema = catalog.schema(&device_type)?;
                let map = self.stored().resolve_identity(schema, value.trim()).await?;
                (device_type, map)
            }
        };

        let schema = catalog.schema(&device_type)?;
        let keys = shown_keys(&catalog, schema, options.summary_only);
        collect_issues(std::slice::from_ref(&map), &mut warnings);
        let text = render_view(&map, schema, &keys, &self.render_options(options.show_tooltip));

        Ok(Report {
            device_type,
            text,
            keys,
            maps: vec![map],
            warnings,
            generated_at: Utc::now(),
        })
    }

    async fn catalog_for(&self, mode: Option<CatalogMode>) -> Result<Arc<Catalog>, CoreError> {
        let current = self.catalog.load_full();
        match mode {
            Some(mode) if mode != current.requested_mode() => self.refresh(mode).await,
            _ => Ok(current),
        }
    }

    fn live(&self) -> LiveSource<'_, P> {
        LiveSource::new(&self.points, self.config.read_timeout)
    }

    fn stored(&self) -> StoredSource<'_, P, S> {
        StoredSource::new(self.live(), &self.store, self.config.strict_store)
    }

    fn render_options(&self, show_tooltip: bool) -> RenderOptions {
        RenderOptions {
            show_tooltip,
            min_width: self.config.min_width,
            column_offset: self.config.column_offset,
        }
    }
}

impl<P, S> fmt::Debug for Engine<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("catalog_dir", &self.local.dir())
            .finish_non_exhaustive()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

type Filters = (Option<BTreeSet<String>>, Option<BTreeSet<String>>);

fn resolve_filters(
    catalog: &Catalog,
    zones: &[String],
    types: &[String],
    warnings: &mut Vec<String>,
) -> Result<Filters, CoreError> {
    let zones = if zones.is_empty() {
        None
    } else {
        let out = resolve_zones(catalog, zones)?;
        for token in &out.invalid {
            warn!(zone = %token, "ignoring unknown zone");
            warnings.push(format!("Ignoring unknown zone '{token}'"));
        }
        Some(out.valid)
    };

    let types = if types.is_empty() {
        None
    } else {
        let out = resolve_device_types(catalog, types)?;
        for token in &out.invalid {
            warn!(device_type = %token, "ignoring unknown device type");
            warnings.push(format!("Ignoring unknown device type '{token}'"));
        }
        Some(out.valid)
    };

    Ok((zones, types))
}

fn single_type(types: BTreeSet<String>) -> Result<String, CoreError> {
    let mut types: Vec<String> = types.into_iter().collect();
    match types.len() {
        1 => Ok(types.remove(0)),
        0 => Err(CoreError::InvalidDeviceType { input: Vec::new() }),
        _ => Err(CoreError::MixedDeviceTypes { types }),
    }
}

fn shown_keys(catalog: &Catalog, schema: &FieldSchema, summary_only: bool) -> Vec<String> {
    let selector = match catalog.device_type(schema.device_type()) {
        Some(t) if summary_only && !t.summary_fields.is_empty() => {
            FieldSelector::Summary(&t.summary_fields)
        }
        _ if summary_only => FieldSelector::Object,
        _ => FieldSelector::All,
    };
    schema.select(selector).into_iter().map(str::to_owned).collect()
}

fn collect_issues(maps: &[FieldValueMap], warnings: &mut Vec<String>) {
    for map in maps {
        warnings.extend(map.issues().iter().map(ToString::to_string));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::tests::{sample, sample_data};
    use crate::model::PointValue;
    use crate::source::{ConfigRecord, MemoryPoints, MemoryStore, NoStore, ObjectRecord};

    fn motor_points(points: MemoryPoints, base: &str, sn: &str) -> MemoryPoints {
        points
            .with(&format!("{base}:DESC"), "M1")
            .with(&format!("{base}:SN"), sn)
            .with(&format!("{base}:PORT"), 3_i64)
    }

    fn points() -> MemoryPoints {
        let points = motor_points(MemoryPoints::default(), "SXR:MMS:01", "SN1");
        let points = motor_points(points, "SXR:MMS:02", "SN2");
        motor_points(points, "SXR:MMS:03", "SN1")
    }

    fn record(sn: &str, desc: &str) -> ObjectRecord {
        ObjectRecord {
            name: format!("motor_{sn}"),
            fields: BTreeMap::from([
                ("FLD_SN".into(), PointValue::from(sn)),
                ("FLD_PORT".into(), PointValue::Int(3)),
            ]),
            config: Some(ConfigRecord {
                name: "sxr_motor".into(),
                fields: BTreeMap::from([("FLD_DESC".into(), PointValue::from(desc))]),
            }),
        }
    }

    fn engine<S: ConfigStore>(store: S) -> Engine<MemoryPoints, S> {
        Engine::with_catalog(EngineConfig::default(), points(), store, sample())
    }

    #[tokio::test]
    async fn diff_two_addresses() {
        let engine = engine(NoStore);
        let report = engine
            .diff(&["SXR:MMS:01", "SXR:MMS:02"], &DiffOptions::default())
            .await
            .unwrap();

        assert_eq!(report.device_type, "ims_motor");
        assert_eq!(report.keys, ["FLD_SN"]);
        assert_eq!(report.maps.len(), 2);
        assert!(report.text.contains("SXR:MMS:02"));
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn diff_against_store_adds_one_column_per_identity() {
        let store = MemoryStore::default()
            .with_object("ims_motor", record("SN1", "M1"))
            .with_object("ims_motor", record("SN2", "renamed"));
        let engine = engine(store);
        let options = DiffOptions {
            compare_against_store: true,
            ..DiffOptions::default()
        };
        let report = engine
            .diff(&["SXR:MMS:01", "SXR:MMS:02", "SXR:MMS:03"], &options)
            .await
            .unwrap();

        // SN1 is shared by two addresses, so two stored maps.
        assert_eq!(report.maps.len(), 5);
        assert_eq!(report.keys, ["FLD_DESC", "FLD_SN"]);
        assert_eq!(report.text.matches("Pmgr").count(), 2);
    }

    #[tokio::test]
    async fn single_address_against_store() {
        let store = MemoryStore::default().with_object("ims_motor", record("SN1", "M1"));
        let engine = engine(store);
        let options = DiffOptions {
            compare_against_store: true,
            ..DiffOptions::default()
        };
        let report = engine.diff(&["SXR:MMS:01"], &options).await.unwrap();
        assert!(report.keys.is_empty());
        assert!(report.text.contains("No differences"));
    }

    #[tokio::test]
    async fn single_address_without_store_is_rejected() {
        let engine = engine(NoStore);
        let err = engine
            .diff(&["SXR:MMS:01"], &DiffOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientSources { found: 1 }));
    }

    #[tokio::test]
    async fn empty_address_list_is_rejected_even_against_store() {
        let engine = engine(NoStore);
        let options = DiffOptions {
            compare_against_store: true,
            ..DiffOptions::default()
        };
        let err = engine.diff::<&str>(&[], &options).await.unwrap_err();
        assert!(matches!(err, CoreError::InsufficientSources { found: 0 }));
    }

    #[tokio::test]
    async fn ambiguous_type_is_returned_not_prompted() {
        let engine = engine(NoStore);
        let err = engine
            .diff(&["XPP:MMS:01", "XPP:MMS:02"], &DiffOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousInference { .. }));

        let options = DiffOptions {
            device_types: vec!["ims_motor".into(), "toaster".into()],
            ..DiffOptions::default()
        };
        let report = engine.diff(&["XPP:MMS:01", "XPP:MMS:02"], &options).await.unwrap();
        assert_eq!(report.device_type, "ims_motor");
        assert!(report.warnings.iter().any(|w| w.contains("toaster")));
        // Nothing is reachable, so every field reads the same sentinel.
        assert!(report.keys.is_empty());
        assert!(report.warnings.iter().any(|w| w.contains("identity unreadable")));
    }

    #[tokio::test]
    async fn mixed_device_types_are_rejected() {
        let engine = engine(NoStore);
        let err = engine
            .diff(&["SXR:MMS:01", "CXI:CAM:01"], &DiffOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MixedDeviceTypes { types } if types == ["gige_cam", "ims_motor"]));
    }

    #[tokio::test]
    async fn invalid_zones_only_is_an_error() {
        let engine = engine(NoStore);
        let options = DiffOptions {
            zones: vec!["bogus".into()],
            ..DiffOptions::default()
        };
        let err = engine.diff(&["SXR:MMS:01", "SXR:MMS:02"], &options).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidZone { .. }));
    }

    #[tokio::test]
    async fn view_summary_of_live_device() {
        let engine = engine(NoStore);
        let options = ViewOptions {
            summary_only: true,
            ..ViewOptions::default()
        };
        let report = engine
            .view(&ViewTarget::Address("SXR:MMS:01".into()), &options)
            .await
            .unwrap();
        assert_eq!(report.keys, ["FLD_DESC", "FLD_SN"]);
        assert!(report.text.contains("SN1"));

        let full = engine
            .view(&ViewTarget::Address("SXR:MMS:01".into()), &ViewOptions::default())
            .await
            .unwrap();
        assert_eq!(full.keys.len(), 3);
    }

    #[tokio::test]
    async fn view_by_identity_reads_the_store_only() {
        let store = MemoryStore::default().with_object("ims_motor", record("SN7", "spare"));
        let engine = Engine::with_catalog(
            EngineConfig::default(),
            MemoryPoints::default(),
            store,
            sample(),
        );
        let target = ViewTarget::Identity {
            device_type: "IMS_MOTOR".into(),
            value: "SN7".into(),
        };
        let report = engine.view(&target, &ViewOptions::default()).await.unwrap();
        assert_eq!(report.maps[0].get("FLD_DESC"), Some("spare"));
        assert!(report.text.contains("Pmgr"));
    }

    #[tokio::test]
    async fn refresh_swaps_snapshot_and_old_readers_keep_theirs() {
        let store = MemoryStore::default().with_catalog(sample_data());
        let engine = engine(store);
        let before = engine.catalog();
        assert_eq!(before.requested_mode(), CatalogMode::Local);

        let after = engine.refresh(CatalogMode::Store).await.unwrap();
        assert_eq!(after.mode(), CatalogMode::Store);
        assert_eq!(engine.catalog().mode(), CatalogMode::Store);
        assert_eq!(before.mode(), CatalogMode::Local);
    }

    #[tokio::test]
    async fn per_call_mode_triggers_reload() {
        let store = MemoryStore::default().with_catalog(sample_data());
        let engine = engine(store);
        let options = DiffOptions {
            mode: Some(CatalogMode::Store),
            ..DiffOptions::default()
        };
        engine
            .diff(&["SXR:MMS:01", "SXR:MMS:02"], &options)
            .await
            .unwrap();
        assert_eq!(engine.catalog().mode(), CatalogMode::Store);
    }
}
