//! Live reference accessors.
//!
//! The snapshot does not talk to a live store itself. A [`RefResolver`]
//! supplied by the host turns an absolute path into a handle, and the
//! snapshot memoizes the handle per view.

use crate::types::AuthMode;
use std::fmt;
use std::sync::Arc;

/// Opaque handle onto a location in a live store.
pub trait LiveReference: fmt::Debug + Send + Sync {
    /// Absolute path this handle points at.
    fn path(&self) -> &str;
}

/// Resolves absolute paths into live handles.
pub trait RefResolver: Send + Sync {
    /// Handle scoped to the auth context the event was produced under.
    fn auth_ref(&self, auth: &AuthMode, path: &str) -> Arc<dyn LiveReference>;

    /// Handle with unrestricted access.
    fn admin_ref(&self, path: &str) -> Arc<dyn LiveReference>;
}
