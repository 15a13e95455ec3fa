//! Array inference.
//!
//! The store has no sequence type, so lists are written as mappings keyed
//! `"0"`, `"1"`, ... On read, a mapping whose keys are all integer literals
//! and dense enough is presented as a JSON array instead.

use crate::types::{SnapshotConfig, TreeValue};
use serde_json::{Map, Value};

/// Materialize `node` with the default configuration.
pub fn normalize(node: Option<&TreeValue>) -> Value {
    normalize_with(node, &SnapshotConfig::default())
}

/// Materialize `node` into caller-owned JSON, converting eligible mappings
/// into arrays bottom-up. Absence becomes `null`.
pub fn normalize_with(node: Option<&TreeValue>, config: &SnapshotConfig) -> Value {
    match node {
        None => Value::Null,
        Some(TreeValue::Map(map)) => {
            let mut children = Map::with_capacity(map.len());
            let mut max_key: u64 = 0;
            let mut all_integer_keys = true;

            for (key, child) in map {
                children.insert(key.clone(), normalize_with(Some(child), config));
                if all_integer_keys {
                    match integer_key(key) {
                        Some(index) => max_key = max_key.max(index),
                        None => all_integer_keys = false,
                    }
                }
            }

            if config.infer_arrays && all_integer_keys && is_dense(max_key, map.len(), config) {
                tracing::trace!(len = map.len(), max_key, "presenting mapping as array");
                into_array(children, max_key)
            } else {
                Value::Object(children)
            }
        }
        Some(leaf) => leaf.to_json(),
    }
}

/// `"0"` or a decimal literal without a leading zero. Keys too large for
/// `u64` are treated as non-integer.
fn integer_key(key: &str) -> Option<u64> {
    let bytes = key.as_bytes();
    let well_formed = match bytes {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    };
    if well_formed {
        key.parse().ok()
    } else {
        None
    }
}

/// Upper bound on `null` holes an inferred array may carry, whatever the
/// configured density. With the default density this only matters for
/// mappings of more than `MAX_ARRAY_HOLES` keys.
pub const MAX_ARRAY_HOLES: u64 = 1 << 20;

fn is_dense(max_key: u64, num_keys: usize, config: &SnapshotConfig) -> bool {
    let num_keys = num_keys as u64;
    let limit = config
        .array_density
        .saturating_mul(num_keys)
        .min(num_keys.saturating_add(MAX_ARRAY_HOLES));
    max_key < limit && usize::try_from(max_key).is_ok_and(|k| k < usize::MAX)
}

fn into_array(children: Map<String, Value>, max_key: u64) -> Value {
    // is_dense keeps max_key + 1 within num_keys + MAX_ARRAY_HOLES.
    let mut items = vec![Value::Null; max_key as usize + 1];
    for (key, value) in children {
        if let Some(index) = integer_key(&key) {
            items[index as usize] = value;
        }
    }
    Value::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(value: Value) -> Value {
        normalize(Some(&TreeValue::from_json(value)))
    }

    #[test]
    fn test_dense_keys_become_array() {
        assert_eq!(norm(json!({"0": "a", "1": "b", "2": "c"})), json!(["a", "b", "c"]));
    }

    #[test]
    fn test_sparse_keys_stay_mapping() {
        assert_eq!(
            norm(json!({"0": "a", "1000": "b"})),
            json!({"0": "a", "1000": "b"})
        );
    }

    #[test]
    fn test_mixed_keys_stay_mapping() {
        assert_eq!(norm(json!({"0": "a", "x": "b"})), json!({"0": "a", "x": "b"}));
        assert_eq!(norm(json!({"x": "b", "0": "a"})), json!({"x": "b", "0": "a"}));
    }

    #[test]
    fn test_leading_zero_is_not_integer() {
        assert_eq!(norm(json!({"0": "a", "01": "b"})), json!({"0": "a", "01": "b"}));
    }

    #[test]
    fn test_holes_are_null() {
        // num_keys = 2, max_key = 3, 3 < 4
        assert_eq!(norm(json!({"0": "a", "3": "d"})), json!(["a", null, null, "d"]));
    }

    #[test]
    fn test_density_boundary() {
        // max_key == 2 * num_keys stays a mapping
        assert_eq!(norm(json!({"0": "a", "4": "b"})), json!({"0": "a", "4": "b"}));
    }

    #[test]
    fn test_unordered_keys_land_by_index() {
        assert_eq!(norm(json!({"2": "c", "0": "a", "1": "b"})), json!(["a", "b", "c"]));
    }

    #[test]
    fn test_nested_conversion_bottom_up() {
        assert_eq!(
            norm(json!({"list": {"0": {"tags": {"0": "x", "1": "y"}}, "1": {"tags": {}}}})),
            json!({"list": [{"tags": ["x", "y"]}, {"tags": {}}]})
        );
    }

    #[test]
    fn test_empty_mapping_stays_mapping() {
        assert_eq!(norm(json!({})), json!({}));
    }

    #[test]
    fn test_leaves_and_absence() {
        assert_eq!(norm(json!(3)), json!(3));
        assert_eq!(norm(json!("s")), json!("s"));
        assert_eq!(norm(json!(null)), Value::Null);
        assert_eq!(normalize(None), Value::Null);
    }

    #[test]
    fn test_huge_integer_key() {
        assert_eq!(
            norm(json!({"0": "a", "99999999999999999999999": "b"})),
            json!({"0": "a", "99999999999999999999999": "b"})
        );
    }

    #[test]
    fn test_inference_disabled() {
        let config = SnapshotConfig {
            infer_arrays: false,
            ..Default::default()
        };
        let tree = TreeValue::from_json(json!({"0": "a", "1": "b"}));
        assert_eq!(normalize_with(Some(&tree), &config), json!({"0": "a", "1": "b"}));
    }

    #[test]
    fn test_custom_density() {
        let config = SnapshotConfig {
            array_density: 4,
            ..Default::default()
        };
        let tree = TreeValue::from_json(json!({"0": "a", "5": "b"}));
        assert_eq!(
            normalize_with(Some(&tree), &config),
            json!(["a", null, null, null, null, "b"])
        );
    }

    #[test]
    fn test_extreme_density_does_not_allocate_huge_array() {
        let config = SnapshotConfig {
            array_density: u64::MAX,
            ..Default::default()
        };
        let tree = TreeValue::from_json(json!({"0": "a", "18446744073709551614": "b"}));
        assert_eq!(
            normalize_with(Some(&tree), &config),
            json!({"0": "a", "18446744073709551614": "b"})
        );

        let tree = TreeValue::from_json(json!({"0": "a", "1": "b"}));
        assert_eq!(normalize_with(Some(&tree), &config), json!(["a", "b"]));
    }

    #[test]
    fn test_holes_capped_under_loose_density() {
        let config = SnapshotConfig {
            array_density: 1 << 40,
            ..Default::default()
        };
        // Two keys: max_key = MAX_ARRAY_HOLES + 2 leaves one hole too many.
        let past_cap = (MAX_ARRAY_HOLES + 2).to_string();
        let tree = TreeValue::from_json(json!({"0": "a", (past_cap): "b"}));
        assert!(normalize_with(Some(&tree), &config).is_object());

        let at_cap = (MAX_ARRAY_HOLES + 1).to_string();
        let tree = TreeValue::from_json(json!({"0": "a", (at_cap): "b"}));
        let value = normalize_with(Some(&tree), &config);
        assert_eq!(value.as_array().map(Vec::len), Some(MAX_ARRAY_HOLES as usize + 2));
    }

    #[test]
    fn test_source_not_mutated() {
        let tree = TreeValue::from_json(json!({"0": "a", "1": "b"}));
        let _ = normalize(Some(&tree));
        assert!(tree.as_map().is_some());
    }
}
