//! Value-resolution and diff engine for devconfig.
//!
//! This crate sits between the HTTP clients in `devconfig-api` and the CLI.
//! It owns the catalog of zones, device types and field schemas, resolves
//! the live and stored values of a device against its schema, and renders
//! aligned comparison reports.
//!
//! ## Architecture
//!
//! - **[`Engine`]** is the facade: [`Engine::diff`] compares devices,
//!   [`Engine::view`] shows one device. It is generic over a
//!   [`PointTransport`] and a [`ConfigStore`].
//! - **[`Catalog`]** is an immutable snapshot of zones, aliases, device
//!   types and schemas, swapped atomically by [`Engine::refresh`].
//! - **[`LiveSource`]** / **[`StoredSource`]** turn a [`FieldSchema`] into a
//!   [`FieldValueMap`].
//! - **[`compute_diff`]**, **[`render_diff`]** and **[`render_view`]** produce
//!   the report.

pub mod catalog;
pub mod config;
mod convert;
pub mod diff;
pub mod engine;
pub mod error;
pub mod model;
pub mod render;
pub mod resolve;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────

pub use catalog::{
    Catalog, CatalogData, CatalogError, CatalogSource, LocalCatalog, SchemaLoadError,
    StoreCatalog, load_catalog,
};
pub use config::{CatalogMode, DiffOrder, EngineConfig};
pub use diff::{DiffResult, compute_diff};
pub use engine::{DiffOptions, Engine, Report, ViewOptions, ViewTarget};
pub use error::CoreError;
pub use render::{RenderOptions, render_diff, render_view};
pub use resolve::{
    TypeResolution, ZoneInference, ZoneResolution, infer_device_type, infer_zone,
    resolve_device_types, resolve_zones,
};
pub use source::{
    ConfigRecord, ConfigStore, LiveSource, MemoryPoints, MemoryStore, NoStore, ObjectRecord,
    PointTransport, SnapshotError, StoreError, StoredSource, TransportError, ValueSource,
};

// ── Model re-exports ────────────────────────────────────────────────

pub use model::{
    DeviceType, FieldDefinition, FieldSchema, FieldScope, FieldSelector, FieldValueMap, LogLevel,
    NO_CON, PointValue, ResolveIssue, STORE_MARKER, SourceLabel, Zone,
};
