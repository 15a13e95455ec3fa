//! Slash-separated path primitives.

use crate::types::TreeValue;

/// Strip one leading and trailing slash run.
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Split a path into its segments. Empty segments are dropped, so
/// `"/a//b/"` and `"a/b"` produce the same parts.
pub fn path_parts(path: &str) -> Vec<&str> {
    normalize_path(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Join two path fragments into one relative path.
pub fn join_path(base: &str, child: &str) -> String {
    let base = normalize_path(base);
    let child = normalize_path(child);
    match (base.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, child),
    }
}

/// Walk `tree` along `parts`.
///
/// Returns `None` when a segment is missing or the walk hits a leaf.
/// An explicit `Null` at the end of the walk is a present value.
pub fn val_at<'a, S: AsRef<str>>(tree: Option<&'a TreeValue>, parts: &[S]) -> Option<&'a TreeValue> {
    let mut current = tree?;
    for part in parts {
        current = current.get(part.as_ref())?;
    }
    Some(current)
}
