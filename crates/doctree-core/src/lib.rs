//! Structured-document editing core.
//!
//! A document is a single-ownership tree of typed entries held in a
//! `doctree-store` backend. This crate supplies the semantics on top:
//! - one handler per node kind implementing the shared operation contract
//!   (`handler::NodeHandler`, looked up by kind tag),
//! - cursor-point-to-root path resolution (`path`),
//! - the command dispatch algorithm with lowest-common-ancestor detection
//!   and ancestor-bubbling retry (`dispatch`),
//! - the batching state-manager façade (`manager::DocManager`).
//!
//! Handlers signal "not applicable here" by returning `false`/`None`; that
//! decline is ordinary control flow, not an error. Invariant violations
//! (unknown keys, non-child index lookups, malformed index paths) panic.

pub mod dispatch;
pub mod handler;
pub mod handlers;
pub mod manager;
pub mod path;
pub mod value;

pub use dispatch::{dispatch_command, Command};
pub use handler::{handler_for, NodeHandler};
pub use manager::{ChangeEvent, DocManager};
pub use path::{path_to_root, Frame};
pub use value::ValueError;

pub use doctree_store as store;
