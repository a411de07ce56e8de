//! The four structural handler shapes.
//!
//! Kind semantics are carried entirely by configuration: the same
//! `ArrayHandler` shape serves both the document root and answer lists,
//! the same `ObjectHandler` serves question blocks and single answers.

mod array;
mod leaf;
mod object;
mod wrapper;

pub use array::ArrayHandler;
pub use leaf::{FlagHandler, TextHandler};
pub use object::ObjectHandler;
pub use wrapper::WrapperHandler;
