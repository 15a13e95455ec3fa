//! Handler invocation around a snapshot.
//!
//! The host keeps live connection objects alive across a handler run via
//! [`InvocationHooks`]. Each hook fires exactly once per invocation, even
//! when the handler fails.

use crate::error::Result;
use crate::resource::ResourcePath;
use crate::snapshot::{DataSnapshot, RefResolver};
use crate::types::{AuthMode, RawEnvelope, SnapshotConfig};
use std::sync::Arc;

/// Side-effecting calls the host makes around a handler.
pub trait InvocationHooks {
    fn retain(&self);
    fn release(&self);
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl InvocationHooks for NoopHooks {
    fn retain(&self) {}
    fn release(&self) {}
}

/// A parsed change event handed to a handler.
#[derive(Clone, Debug)]
pub struct DatabaseEvent {
    pub resource: ResourcePath,
    pub auth: AuthMode,
    /// Post-change view at the event path. Use `data.previous()` for the
    /// pre-change view.
    pub data: DataSnapshot,
}

impl DatabaseEvent {
    pub fn from_envelope(envelope: RawEnvelope) -> Result<Self> {
        Self::from_envelope_with_config(envelope, SnapshotConfig::default())
    }

    pub fn from_envelope_with_config(envelope: RawEnvelope, config: SnapshotConfig) -> Result<Self> {
        let resource = ResourcePath::parse(&envelope.resource)?;
        let data = DataSnapshot::from_parsed(&resource, envelope, config);
        Ok(Self {
            auth: data.auth().clone(),
            resource,
            data,
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn RefResolver>) -> Self {
        self.data = self.data.with_resolver(resolver);
        self
    }
}

/// Run `handler` on `event` between `retain` and `release`.
pub fn run<H, F, T>(hooks: &H, event: DatabaseEvent, handler: F) -> Result<T>
where
    H: InvocationHooks + ?Sized,
    F: FnOnce(DatabaseEvent) -> Result<T>,
{
    tracing::trace!(resource = %event.resource, "retain");
    hooks.retain();
    let result = handler(event);
    hooks.release();
    tracing::trace!(ok = result.is_ok(), "release");
    result
}

/// Parse `envelope` and run `handler` on it. A malformed envelope fails
/// before any hook is called.
pub fn dispatch<H, F, T>(hooks: &H, envelope: RawEnvelope, handler: F) -> Result<T>
where
    H: InvocationHooks + ?Sized,
    F: FnOnce(DatabaseEvent) -> Result<T>,
{
    let event = DatabaseEvent::from_envelope(envelope)?;
    run(hooks, event, handler)
}
