// ── Domain model ──

pub mod schema;
pub mod value;
pub mod zone;

pub use schema::{FieldDefinition, FieldSchema, FieldScope, FieldSelector};
pub use value::{FieldValueMap, NO_CON, PointValue, ResolveIssue, STORE_MARKER, SourceLabel};
pub use zone::{DeviceType, LogLevel, Zone};
