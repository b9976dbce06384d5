// ── Resolved value types ──

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value shown for a field whose control point could not be reached.
pub const NO_CON: &str = "NO CON";

/// Marker shown for the configuration-store column.
pub const STORE_MARKER: &str = "Pmgr";

/// A raw scalar as delivered by a control point or the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum PointValue {
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl PointValue {
    /// Interpret the value as a zero-based enumeration index.
    ///
    /// Accepts integers, integral floats and integer text.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Int(i) => usize::try_from(*i).ok(),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Self::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX.into() => {
                Some(*f as usize)
            }
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

impl From<Value> for PointValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Int(i64::from(b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&str> for PointValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for PointValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Where a `FieldValueMap` came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceLabel {
    /// Live read of a device base address.
    Live { address: String },
    /// Configuration-store record of the device with this identity value.
    Stored { identity: String },
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live { address } => f.write_str(address),
            Self::Stored { .. } => f.write_str(STORE_MARKER),
        }
    }
}

/// Partial-failure information recorded while resolving a value map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ResolveIssue {
    /// The field's control point could not be read.
    Unreachable {
        field: String,
        address: String,
        reason: String,
    },
    /// Identity read failed, so the remaining reads were not attempted.
    ShortCircuit { address: String, skipped: usize },
    /// Enumeration index outside the label table.
    EnumOutOfRange { field: String, raw: String },
    /// Schema field found in neither the stored object nor its config.
    SchemaMismatch { field: String },
}

impl fmt::Display for ResolveIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable {
                field,
                address,
                reason,
            } => write!(f, "{field}: cannot read {address} ({reason})"),
            Self::ShortCircuit { address, skipped } => write!(
                f,
                "{address}: identity unreadable, skipped {skipped} remaining field reads"
            ),
            Self::EnumOutOfRange { field, raw } => write!(
                f,
                "{field}: device and stored enumeration are out of sync (raw value {raw})"
            ),
            Self::SchemaMismatch { field } => {
                write!(f, "{field}: missing from the stored object and configuration")
            }
        }
    }
}

/// Resolved field values of one source, in schema order.
///
/// Values are strings with enumeration labels already applied. A map is
/// populated once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValueMap {
    source: SourceLabel,
    values: IndexMap<String, String>,
    issues: Vec<ResolveIssue>,
}

impl FieldValueMap {
    pub fn new(
        source: SourceLabel,
        values: IndexMap<String, String>,
        issues: Vec<ResolveIssue>,
    ) -> Self {
        Self {
            source,
            values,
            issues,
        }
    }

    pub fn source(&self) -> &SourceLabel {
        &self.source
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn issues(&self) -> &[ResolveIssue] {
        &self.issues
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValueMap {
    /// Collect into a live map with an empty source address. Mostly useful
    /// for building fixtures.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            SourceLabel::Live {
                address: String::new(),
            },
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            Vec::new(),
        )
    }
}
