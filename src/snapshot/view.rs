//! Before/after views over a single change.

use crate::delta::apply_change;
use crate::error::{Result, SnapshotError};
use crate::normalize::normalize_with;
use crate::path::{join_path, normalize_path, path_parts, val_at};
use crate::resource::ResourcePath;
use crate::types::{AuthMode, RawEnvelope, SnapshotConfig, TreeValue};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::refs::{LiveReference, RefResolver};

/// Trees shared by every view derived from one envelope.
struct SnapshotSource {
    /// Absolute path of the changed location.
    path: String,
    auth: AuthMode,
    base: Option<TreeValue>,
    delta: Option<TreeValue>,
    /// `base` with `delta` applied. Frozen at construction.
    derived: Option<TreeValue>,
    config: SnapshotConfig,
}

/// The state of the tree at a relative path, before or after a change.
///
/// Views are immutable. Navigation returns new views that share the
/// underlying trees and differ only in offset and the before/after flag.
#[derive(Clone)]
pub struct DataSnapshot {
    source: Arc<SnapshotSource>,
    resolver: Option<Arc<dyn RefResolver>>,
    /// Offset from `source.path`, without leading or trailing slashes.
    child_path: String,
    is_previous: bool,
    auth_ref: OnceLock<Arc<dyn LiveReference>>,
    admin_ref: OnceLock<Arc<dyn LiveReference>>,
}

impl DataSnapshot {
    /// Build the post-change view of `base` patched by `delta` at `path`.
    pub fn new(
        path: impl Into<String>,
        auth: AuthMode,
        base: Option<TreeValue>,
        delta: Option<TreeValue>,
        config: SnapshotConfig,
    ) -> Self {
        let path = path.into();
        let derived = apply_change(base.as_ref(), delta.as_ref());
        tracing::debug!(
            path = %path,
            has_base = base.is_some(),
            has_delta = delta.is_some(),
            "built snapshot"
        );

        Self {
            source: Arc::new(SnapshotSource {
                path,
                auth,
                base,
                delta,
                derived,
                config,
            }),
            resolver: None,
            child_path: String::new(),
            is_previous: false,
            auth_ref: OnceLock::new(),
            admin_ref: OnceLock::new(),
        }
    }

    /// Build from a raw envelope with the default configuration.
    pub fn from_envelope(envelope: RawEnvelope) -> Result<Self> {
        Self::from_envelope_with_config(envelope, SnapshotConfig::default())
    }

    /// Build from a raw envelope. Fails if the resource is malformed.
    pub fn from_envelope_with_config(envelope: RawEnvelope, config: SnapshotConfig) -> Result<Self> {
        let resource = ResourcePath::parse(&envelope.resource)?;
        Ok(Self::from_parsed(&resource, envelope, config))
    }

    /// Build from an envelope whose resource has already been parsed.
    pub(crate) fn from_parsed(
        resource: &ResourcePath,
        envelope: RawEnvelope,
        config: SnapshotConfig,
    ) -> Self {
        tracing::debug!(instance = %resource.instance, path = %resource.path, "parsed envelope");
        Self::new(
            resource.path.clone(),
            envelope.auth.unwrap_or_default(),
            envelope.data.data.map(TreeValue::from_json),
            envelope.data.delta.map(TreeValue::from_json),
            config,
        )
    }

    /// Parse a JSON-encoded envelope and build from it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let envelope: RawEnvelope = serde_json::from_str(json)?;
        Self::from_envelope(envelope)
    }

    /// Attach the resolver used by [`reference`](Self::reference) and
    /// [`admin_reference`](Self::admin_reference).
    pub fn with_resolver(mut self, resolver: Arc<dyn RefResolver>) -> Self {
        self.resolver = Some(resolver);
        self.auth_ref = OnceLock::new();
        self.admin_ref = OnceLock::new();
        self
    }

    fn dup(&self, is_previous: bool, child_path: String) -> Self {
        Self {
            source: Arc::clone(&self.source),
            resolver: self.resolver.clone(),
            child_path,
            is_previous,
            auth_ref: OnceLock::new(),
            admin_ref: OnceLock::new(),
        }
    }

    fn parts(&self) -> Vec<&str> {
        path_parts(&self.child_path)
    }

    fn resolve(&self) -> Option<&TreeValue> {
        let tree = if self.is_previous {
            self.source.base.as_ref()
        } else {
            self.source.derived.as_ref()
        };
        val_at(tree, &self.parts())
    }

    // --- Reading ---

    /// Materialized value at this view, `null` when nothing is there.
    pub fn val(&self) -> Value {
        normalize_with(self.resolve(), &self.source.config)
    }

    /// Same as [`val`](Self::val).
    pub fn to_json(&self) -> Value {
        self.val()
    }

    pub fn exists(&self) -> bool {
        // Normalization only yields null for absence or an explicit null.
        matches!(self.resolve(), Some(value) if !value.is_null())
    }

    /// Whether the delta touches this path or anything below it.
    ///
    /// Independent of the before/after flag.
    pub fn changed(&self) -> bool {
        val_at(self.source.delta.as_ref(), &self.parts()).is_some()
    }

    // --- Navigation ---

    /// Last segment of the absolute path, `None` at the root.
    pub fn key(&self) -> Option<String> {
        let full = join_path(&self.source.path, &self.child_path);
        path_parts(&full).last().map(|s| s.to_string())
    }

    /// Absolute path of this view.
    pub fn path(&self) -> String {
        format!("/{}", join_path(&self.source.path, &self.child_path))
    }

    /// View at `path` relative to this one. Never fails; check
    /// [`exists`](Self::exists) for presence.
    pub fn child(&self, path: &str) -> Self {
        if normalize_path(path).is_empty() {
            return self.clone();
        }
        self.dup(self.is_previous, join_path(&self.child_path, path))
    }

    /// Pre-change view at the same offset.
    pub fn previous(&self) -> Self {
        self.dup(true, self.child_path.clone())
    }

    /// Post-change view at the same offset.
    pub fn current(&self) -> Self {
        self.dup(false, self.child_path.clone())
    }

    pub fn is_previous(&self) -> bool {
        self.is_previous
    }

    pub fn auth(&self) -> &AuthMode {
        &self.source.auth
    }

    // --- Children ---

    /// Visit every child of a mapping value in order. Does nothing for
    /// leaves, arrays and absence.
    pub fn for_each<F: FnMut(DataSnapshot)>(&self, mut visit: F) {
        if let Value::Object(map) = self.val() {
            for key in map.keys() {
                visit(self.child(key));
            }
        }
    }

    pub fn has_child(&self, path: &str) -> bool {
        self.child(path).exists()
    }

    /// True only for a non-empty mapping. Values presented as arrays
    /// report no children.
    pub fn has_children(&self) -> bool {
        matches!(self.val(), Value::Object(map) if !map.is_empty())
    }

    /// Key count of a mapping value, 0 for anything else including arrays.
    pub fn num_children(&self) -> usize {
        match self.val() {
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    // --- Live references ---

    /// Handle scoped to the event's auth context, resolved once per view.
    pub fn reference(&self) -> Result<Arc<dyn LiveReference>> {
        let resolver = self.resolver.as_ref().ok_or(SnapshotError::NoResolver)?;
        let handle = self
            .auth_ref
            .get_or_init(|| resolver.auth_ref(&self.source.auth, &self.path()));
        Ok(Arc::clone(handle))
    }

    /// Unrestricted handle, resolved once per view.
    pub fn admin_reference(&self) -> Result<Arc<dyn LiveReference>> {
        let resolver = self.resolver.as_ref().ok_or(SnapshotError::NoResolver)?;
        let handle = self
            .admin_ref
            .get_or_init(|| resolver.admin_ref(&self.path()));
        Ok(Arc::clone(handle))
    }
}

impl fmt::Debug for DataSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSnapshot")
            .field("path", &self.path())
            .field("is_previous", &self.is_previous)
            .finish()
    }
}
