//! Core types for snapshot views.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Ordered mapping from child key to subtree.
pub type TreeMap = IndexMap<String, TreeValue>;

/// A node of the hierarchical store.
///
/// The store only knows keyed mappings and leaves. Sequences are a
/// presentation concern and are re-derived by [`crate::normalize`].
#[derive(Clone, PartialEq, Default)]
pub enum TreeValue {
    /// Explicit null. In a delta this is a tombstone.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Map(TreeMap),
}

impl TreeValue {
    /// Convert an untyped JSON tree at the ingestion boundary.
    ///
    /// Arrays become mappings keyed by their decimal index.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => TreeValue::Null,
            Value::Bool(b) => TreeValue::Bool(b),
            Value::Number(n) => TreeValue::Number(n),
            Value::String(s) => TreeValue::String(s),
            Value::Array(items) => TreeValue::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), TreeValue::from_json(v)))
                    .collect(),
            ),
            Value::Object(obj) => TreeValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, TreeValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Raw JSON form, without array inference.
    pub fn to_json(&self) -> Value {
        match self {
            TreeValue::Null => Value::Null,
            TreeValue::Bool(b) => Value::Bool(*b),
            TreeValue::Number(n) => Value::Number(n.clone()),
            TreeValue::String(s) => Value::String(s.clone()),
            TreeValue::Map(map) => {
                let mut obj = Map::with_capacity(map.len());
                for (k, v) in map {
                    obj.insert(k.clone(), v.to_json());
                }
                Value::Object(obj)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TreeValue::Null)
    }

    pub fn as_map(&self) -> Option<&TreeMap> {
        match self {
            TreeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Direct child by key. `None` for leaves and missing keys.
    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl fmt::Debug for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeValue({})", self.to_json())
    }
}

impl From<Value> for TreeValue {
    fn from(value: Value) -> Self {
        TreeValue::from_json(value)
    }
}

impl Serialize for TreeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TreeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TreeValue::from_json)
    }
}

/// Authorization context an event was produced under.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthMode {
    /// Unrestricted access.
    #[serde(default)]
    pub admin: bool,

    /// Auth variable of the end user, `None` when unauthenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Value>,
}

impl AuthMode {
    pub fn admin() -> Self {
        Self {
            admin: true,
            variable: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn user(variable: Value) -> Self {
        Self {
            admin: false,
            variable: Some(variable),
        }
    }
}

/// Tree payload of an envelope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnvelopeData {
    /// State before the change. Missing means absent, `null` is a value.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Sparse description of the changed subtrees.
    /// A `null` delta is a tombstone for the whole node.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub delta: Option<Value>,
}

/// Keep an explicit `null` as `Some(Value::Null)`. Only a missing field
/// falls back to `None` through `#[serde(default)]`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Raw change envelope as delivered by the hosting event system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawEnvelope {
    /// `projects/_/instances/<instance>/refs/<path>`.
    pub resource: String,

    #[serde(default)]
    pub auth: Option<AuthMode>,

    #[serde(default)]
    pub data: EnvelopeData,
}

/// Snapshot configuration.
#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Convert dense integer-keyed mappings into sequences on read.
    pub infer_arrays: bool,

    /// A mapping converts only while `max_key < array_density * num_keys`.
    /// Default: 2
    pub array_density: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            infer_arrays: true,
            array_density: 2,
        }
    }
}
