// ── Diff engine ──

use serde::Serialize;

use crate::config::DiffOrder;
use crate::error::CoreError;
use crate::model::FieldValueMap;

/// Keys on which two or more value maps disagree, with the maps compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    keys: Vec<String>,
    maps: Vec<FieldValueMap>,
}

impl DiffResult {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn maps(&self) -> &[FieldValueMap] {
        &self.maps
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<FieldValueMap>) {
        (self.keys, self.maps)
    }
}

/// Compare the first map against every later one.
///
/// A key of the first map diffs when any later map holding that key has a
/// different value; later maps missing the key are not compared on it.
pub fn compute_diff(maps: Vec<FieldValueMap>, order: DiffOrder) -> Result<DiffResult, CoreError> {
    let Some((first, rest)) = maps.split_first() else {
        return Err(CoreError::InsufficientSources { found: 0 });
    };
    if rest.is_empty() {
        return Err(CoreError::InsufficientSources { found: 1 });
    }

    let mut keys: Vec<String> = first
        .iter()
        .filter(|(key, value)| rest.iter().any(|m| m.get(key).is_some_and(|v| v != *value)))
        .map(|(key, _)| key.to_owned())
        .collect();

    if order == DiffOrder::Lexicographic {
        keys.sort_unstable();
    }

    Ok(DiffResult { keys, maps })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn motor(sn: &str) -> FieldValueMap {
        [("FLD_DESC", "M1"), ("FLD_SN", sn), ("FLD_PORT", "3")]
            .into_iter()
            .collect()
    }

    #[test]
    fn two_addresses_differ_on_serial_only() {
        let diff = compute_diff(vec![motor("SN1"), motor("SN2")], DiffOrder::Lexicographic).unwrap();
        assert_eq!(diff.keys(), ["FLD_SN"]);
        assert_eq!(diff.maps().len(), 2);
    }

    #[test]
    fn identical_maps_have_no_diff() {
        let diff = compute_diff(vec![motor("SN1"), motor("SN1")], DiffOrder::Lexicographic).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn diff_is_idempotent() {
        let a: FieldValueMap = [("B", "1"), ("A", "1"), ("C", "x")].into_iter().collect();
        let b: FieldValueMap = [("B", "2"), ("A", "2"), ("C", "x")].into_iter().collect();
        let first = compute_diff(vec![a.clone(), b.clone()], DiffOrder::Lexicographic).unwrap();
        let second = compute_diff(vec![a, b], DiffOrder::Lexicographic).unwrap();
        assert_eq!(first.keys(), second.keys());
        assert_eq!(first.keys(), ["A", "B"]);
    }

    #[test]
    fn schema_order_keeps_first_map_order() {
        let a: FieldValueMap = [("B", "1"), ("A", "1")].into_iter().collect();
        let b: FieldValueMap = [("B", "2"), ("A", "2")].into_iter().collect();
        let diff = compute_diff(vec![a, b], DiffOrder::Schema).unwrap();
        assert_eq!(diff.keys(), ["B", "A"]);
    }

    #[test]
    fn any_later_map_can_cause_a_diff() {
        let diff = compute_diff(
            vec![motor("SN1"), motor("SN1"), motor("SN3")],
            DiffOrder::Lexicographic,
        )
        .unwrap();
        assert_eq!(diff.keys(), ["FLD_SN"]);
    }

    #[test]
    fn keys_missing_from_later_maps_are_skipped() {
        let a = motor("SN1");
        let b: FieldValueMap = [("FLD_DESC", "M2")].into_iter().collect();
        let diff = compute_diff(vec![a, b], DiffOrder::Lexicographic).unwrap();
        assert_eq!(diff.keys(), ["FLD_DESC"]);
    }

    #[test]
    fn fewer_than_two_maps_is_an_error() {
        let err = compute_diff(vec![motor("SN1")], DiffOrder::Lexicographic).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientSources { found: 1 }));
        let err = compute_diff(Vec::new(), DiffOrder::Lexicographic).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientSources { found: 0 }));
    }
}
