//! # Delta View
//!
//! Before and after views of a partial update to a hierarchical key-value
//! store.
//!
//! ## Core Concepts
//!
//! - **Trees**: Keyed mappings and leaves, with insertion-ordered keys
//! - **Deltas**: Sparse trees describing only the changed subtrees
//! - **Snapshots**: Immutable views at a relative path, pre- or post-change
//! - **Array inference**: Dense integer-keyed mappings read back as arrays
//!
//! ## Example
//!
//! ```ignore
//! use deltaview::DataSnapshot;
//!
//! let snap = DataSnapshot::from_json_str(r#"{
//!     "resource": "projects/_/instances/db/refs/users/alice",
//!     "data": {
//!         "data": {"name": "Alice", "tags": {"0": "a", "1": "b"}},
//!         "delta": {"name": "Alicia"}
//!     }
//! }"#)?;
//!
//! assert_eq!(snap.key().as_deref(), Some("alice"));
//! assert!(snap.child("name").changed());
//! assert_eq!(snap.child("name").previous().val(), json!("Alice"));
//! assert_eq!(snap.child("tags").val(), json!(["a", "b"]));
//! ```

pub mod delta;
pub mod error;
pub mod lifecycle;
pub mod normalize;
pub mod path;
pub mod resource;
pub mod snapshot;
pub mod types;

// Re-exports
pub use delta::apply_change;
pub use error::{Result, SnapshotError};
pub use lifecycle::{dispatch, run, DatabaseEvent, InvocationHooks, NoopHooks};
pub use normalize::{normalize, normalize_with, MAX_ARRAY_HOLES};
pub use path::{join_path, normalize_path, path_parts, val_at};
pub use resource::{ResourcePath, PROJECT_PLACEHOLDER};
pub use snapshot::{DataSnapshot, LiveReference, RefResolver};
pub use types::*;
