//! Delta application.

use crate::types::{TreeMap, TreeValue};

/// Apply a sparse `delta` onto `base`, producing the post-change tree.
///
/// Neither input is modified. A leaf (or `Null`) in the delta replaces
/// whatever the base holds at that path; a mapping in the delta merges key
/// by key, carrying through base keys it does not mention. An absent delta
/// leaves the base as it is.
pub fn apply_change(base: Option<&TreeValue>, delta: Option<&TreeValue>) -> Option<TreeValue> {
    match delta {
        None => base.cloned(),
        Some(delta) => Some(merge(base, delta)),
    }
}

fn merge(base: Option<&TreeValue>, delta: &TreeValue) -> TreeValue {
    let TreeValue::Map(delta_map) = delta else {
        return delta.clone();
    };

    // A leaf in the base has no children to merge into.
    let base_map = base.and_then(TreeValue::as_map);

    let mut result = TreeMap::with_capacity(delta_map.len());
    if let Some(base_map) = base_map {
        for (key, base_child) in base_map {
            let merged = match delta_map.get(key) {
                Some(delta_child) => merge(Some(base_child), delta_child),
                None => base_child.clone(),
            };
            result.insert(key.clone(), merged);
        }
    }
    for (key, delta_child) in delta_map {
        if !result.contains_key(key) {
            result.insert(key.clone(), merge(None, delta_child));
        }
    }

    TreeValue::Map(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn tree(value: Value) -> TreeValue {
        TreeValue::from_json(value)
    }

    fn apply(base: Value, delta: Value) -> Value {
        apply_change(Some(&tree(base)), Some(&tree(delta)))
            .unwrap()
            .to_json()
    }

    #[test]
    fn test_scalar_overrides_subtree() {
        assert_eq!(apply(json!({"a": {"x": 1, "y": 2}}), json!({"a": 5})), json!({"a": 5}));
    }

    #[test]
    fn test_merge_preserves_unmentioned_keys() {
        assert_eq!(apply(json!({"a": 1, "b": 2}), json!({"b": 3})), json!({"a": 1, "b": 3}));
    }

    #[test]
    fn test_tombstone_kept_as_null() {
        assert_eq!(
            apply(json!({"a": 1, "b": 2}), json!({"b": null})),
            json!({"a": 1, "b": null})
        );
    }

    #[test]
    fn test_nested_merge() {
        assert_eq!(
            apply(
                json!({"users": {"a": {"name": "A", "age": 1}, "b": {"name": "B"}}}),
                json!({"users": {"a": {"age": 2}, "c": {"name": "C"}}})
            ),
            json!({"users": {"a": {"name": "A", "age": 2}, "b": {"name": "B"}, "c": {"name": "C"}}})
        );
    }

    #[test]
    fn test_mapping_delta_over_leaf_base() {
        assert_eq!(apply(json!({"a": 1}), json!({"a": {"b": 2}})), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_absent_inputs() {
        assert_eq!(apply_change(None, None), None);
        let base = tree(json!({"a": 1}));
        assert_eq!(apply_change(Some(&base), None), Some(base.clone()));
        let delta = tree(json!({"a": 2}));
        assert_eq!(apply_change(None, Some(&delta)), Some(delta));
    }

    #[test]
    fn test_leaf_delta_at_root() {
        assert_eq!(apply(json!({"a": 1}), json!(null)), json!(null));
        assert_eq!(apply(json!({"a": 1}), json!("x")), json!("x"));
    }

    #[test]
    fn test_inputs_untouched() {
        let base = tree(json!({"a": {"x": 1}}));
        let delta = tree(json!({"a": {"y": 2}}));
        let _ = apply_change(Some(&base), Some(&delta));
        assert_eq!(base.to_json(), json!({"a": {"x": 1}}));
        assert_eq!(delta.to_json(), json!({"a": {"y": 2}}));
    }

    #[test]
    fn test_reapply_empty_delta() {
        let base = tree(json!({"a": {"x": 1}, "b": 2}));
        let delta = tree(json!({"a": {"y": 3}}));
        let once = apply_change(Some(&base), Some(&delta));
        let twice = apply_change(once.as_ref(), Some(&tree(json!({}))));
        assert_eq!(once, twice);
    }
}
