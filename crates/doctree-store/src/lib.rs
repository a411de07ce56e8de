//! Storage primitives for doctree-rs.
//!
//! This crate owns the identity and persistence layer of the editing core:
//! - typed keys tagged with their node kind (`Key`, `NodeKind`),
//! - stored records (`Entry`, `NodeValue`) and child addressing (`Index`),
//! - the cursor representation (`Point`, `Cursor`),
//! - swappable storage backends (`LocalBackend`, `SharedBackend`),
//! - the writable entry store (`DocStore`).
//!
//! Node semantics (handlers, command dispatch, selection walking) live in
//! `doctree-core`; this crate knows nothing about what the kinds mean.

pub mod backend;
pub mod cursor;
pub mod entry;
pub mod key;
pub mod store;

pub use backend::{LocalBackend, SharedBackend, StorageBackend};
pub use cursor::{Cursor, Point};
pub use entry::{Entry, Index, NodeValue};
pub use key::{Key, KeyParseError, NodeKind};
pub use store::DocStore;

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
