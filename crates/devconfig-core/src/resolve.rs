// ── Zone / alias / device-type resolution ──
//
// Turns operator input into canonical catalog names. Unknown tokens are
// reported back rather than failing the call, unless nothing resolves.
// Type inference never prompts: an ambiguous address comes back as
// `CoreError::AmbiguousInference` for the caller to settle.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::CoreError;

/// Canonical zones resolved from operator tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneResolution {
    pub valid: BTreeSet<String>,
    /// Tokens that matched neither a zone nor an alias.
    pub invalid: BTreeSet<String>,
}

/// Canonical device types resolved from operator tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeResolution {
    pub valid: BTreeSet<String>,
    pub invalid: BTreeSet<String>,
}

/// Result of matching an address prefix against zones and aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneInference {
    Matched(BTreeSet<String>),
    Unmatched,
}

pub fn resolve_zones<T: AsRef<str>>(
    catalog: &Catalog,
    tokens: &[T],
) -> Result<ZoneResolution, CoreError> {
    let mut out = ZoneResolution::default();
    for token in tokens {
        let token = token.as_ref().trim().to_lowercase();
        match expand_zone(catalog, &token) {
            Some(zones) => out.valid.extend(zones),
            None => {
                out.invalid.insert(token);
            }
        }
    }

    if out.valid.is_empty() {
        return Err(CoreError::InvalidZone {
            input: tokens.iter().map(|t| t.as_ref().to_owned()).collect(),
        });
    }
    debug!(valid = ?out.valid, invalid = ?out.invalid, "zones resolved");
    Ok(out)
}

pub fn resolve_device_types<T: AsRef<str>>(
    catalog: &Catalog,
    tokens: &[T],
) -> Result<TypeResolution, CoreError> {
    let mut out = TypeResolution::default();
    for token in tokens {
        let token = token.as_ref().trim().to_lowercase();
        if catalog.device_type(&token).is_some() {
            out.valid.insert(token);
        } else {
            out.invalid.insert(token);
        }
    }

    if out.valid.is_empty() {
        return Err(CoreError::InvalidDeviceType {
            input: tokens.iter().map(|t| t.as_ref().to_owned()).collect(),
        });
    }
    Ok(out)
}

/// Match the leading token of `address` against zone names and aliases.
///
/// The token is the text before the first `:`, `.`, `-` or `_`, compared
/// case-insensitively.
pub fn infer_zone(catalog: &Catalog, address: &str) -> ZoneInference {
    let prefix = address
        .trim()
        .split([':', '.', '-', '_'])
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_lowercase();

    match expand_zone(catalog, &prefix) {
        Some(zones) => ZoneInference::Matched(zones),
        None => ZoneInference::Unmatched,
    }
}

/// Pick the single device type `address` can be.
///
/// Candidates are the types hosted by `zones` (or the zones inferred from
/// the address, or every type if neither applies), narrowed by `types`.
/// An explicit type filter that excludes every hosted type still wins.
pub fn infer_device_type(
    catalog: &Catalog,
    address: &str,
    zones: Option<&BTreeSet<String>>,
    types: Option<&BTreeSet<String>>,
) -> Result<String, CoreError> {
    let inferred;
    let zones = match zones {
        Some(z) => Some(z),
        None => match infer_zone(catalog, address) {
            ZoneInference::Matched(z) => {
                inferred = z;
                Some(&inferred)
            }
            ZoneInference::Unmatched => None,
        },
    };

    let hosted: BTreeSet<String> = match zones {
        Some(zones) => zones
            .iter()
            .filter_map(|z| catalog.zone(z))
            .flat_map(|z| z.device_types.iter().cloned())
            .collect(),
        None => catalog.device_types().map(|t| t.name.clone()).collect(),
    };

    let mut candidates: Vec<String> = match types {
        Some(filter) => hosted.intersection(filter).cloned().collect(),
        None => hosted.into_iter().collect(),
    };
    if candidates.is_empty() {
        if let Some(filter) = types {
            candidates = filter.iter().cloned().collect();
        }
    }

    match candidates.len() {
        0 => Err(CoreError::InvalidDeviceType {
            input: vec![address.to_owned()],
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(CoreError::AmbiguousInference {
            address: address.to_owned(),
            candidates,
        }),
    }
}

fn expand_zone(catalog: &Catalog, token: &str) -> Option<BTreeSet<String>> {
    if let Some(zone) = catalog.zone(token) {
        return Some(BTreeSet::from([zone.name.clone()]));
    }
    catalog.aliases().get(token).map(|zones| {
        zones
            .iter()
            .filter(|z| catalog.zone(z).is_some())
            .cloned()
            .collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn alias_and_canonical_names_resolve_alike() {
        let catalog = sample();
        for zone in catalog.zones() {
            let by_name = resolve_zones(&catalog, &[zone.name.as_str()]).unwrap();
            assert_eq!(by_name.valid, set(&[zone.name.as_str()]));
            for alias in &zone.aliases {
                let by_alias = resolve_zones(&catalog, &[alias.as_str()]).unwrap();
                assert!(by_alias.valid.contains(&zone.name));
                assert_eq!(by_alias.valid, catalog.aliases()[alias]);
            }
        }
    }

    #[test]
    fn alias_fans_out_and_unknown_tokens_are_reported() {
        let catalog = sample();
        let out = resolve_zones(&catalog, &["sxd", "bogus"]).unwrap();
        assert_eq!(out.valid, set(&["sxr", "xpp"]));
        assert_eq!(out.invalid, set(&["bogus"]));
    }

    #[test]
    fn input_is_case_insensitive() {
        let catalog = sample();
        let out = resolve_zones(&catalog, &["SXR", "Cxi"]).unwrap();
        assert_eq!(out.valid, set(&["cxi", "sxr"]));
        assert!(out.invalid.is_empty());
    }

    #[test]
    fn nothing_valid_is_an_error() {
        let catalog = sample();
        let err = resolve_zones(&catalog, &["bogus", "nope"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidZone { input } if input == ["bogus", "nope"]));

        let err = resolve_device_types(&catalog, &["toaster"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDeviceType { .. }));
    }

    #[test]
    fn device_types_are_validated() {
        let catalog = sample();
        let out = resolve_device_types(&catalog, &["IMS_MOTOR", "toaster"]).unwrap();
        assert_eq!(out.valid, set(&["ims_motor"]));
        assert_eq!(out.invalid, set(&["toaster"]));
    }

    #[test]
    fn zone_inferred_from_address_prefix() {
        let catalog = sample();
        assert_eq!(
            infer_zone(&catalog, "SXR:EXP:MMS:01"),
            ZoneInference::Matched(set(&["sxr"]))
        );
        assert_eq!(
            infer_zone(&catalog, "sxd-mms-01"),
            ZoneInference::Matched(set(&["sxr", "xpp"]))
        );
        assert_eq!(infer_zone(&catalog, "MEC:MMS:01"), ZoneInference::Unmatched);
    }

    #[test]
    fn unique_hosted_type_is_inferred() {
        let catalog = sample();
        assert_eq!(
            infer_device_type(&catalog, "SXR:MMS:01", None, None).unwrap(),
            "ims_motor"
        );
        assert_eq!(
            infer_device_type(&catalog, "CXI:CAM:01", None, None).unwrap(),
            "gige_cam"
        );
    }

    #[test]
    fn several_hosted_types_are_ambiguous() {
        let catalog = sample();
        let err = infer_device_type(&catalog, "XPP:MMS:01", None, None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::AmbiguousInference { candidates, .. } if candidates == ["gige_cam", "ims_motor"]
        ));

        // Unknown zone prefix considers every type.
        let err = infer_device_type(&catalog, "MEC:MMS:01", None, None).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousInference { .. }));
    }

    #[test]
    fn explicit_filters_settle_ambiguity() {
        let catalog = sample();
        let motor = set(&["ims_motor"]);
        assert_eq!(
            infer_device_type(&catalog, "XPP:MMS:01", None, Some(&motor)).unwrap(),
            "ims_motor"
        );
        assert_eq!(
            infer_device_type(&catalog, "MEC:MMS:01", Some(&set(&["sxr"])), None).unwrap(),
            "ims_motor"
        );
        // Explicit type outside the inferred zone is still honored.
        let cam = set(&["gige_cam"]);
        assert_eq!(
            infer_device_type(&catalog, "SXR:CAM:01", None, Some(&cam)).unwrap(),
            "gige_cam"
        );
    }
}
