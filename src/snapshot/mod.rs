//! Snapshot navigation.
//!
//! A [`DataSnapshot`] is built once from a change envelope. The base tree,
//! the delta and the derived post-change tree are frozen at that point and
//! shared by every view navigated from it:
//!
//! ```ignore
//! let snap = DataSnapshot::from_envelope(envelope)?;
//!
//! let name = snap.child("profile/name");
//! if name.changed() {
//!     println!("{} -> {}", name.previous().val(), name.val());
//! }
//! ```

mod refs;
mod view;

pub use refs::{LiveReference, RefResolver};
pub use view::DataSnapshot;
