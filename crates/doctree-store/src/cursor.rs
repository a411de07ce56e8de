//! Cursor representation.
//!
//! A point addresses a whole node, or a character offset inside a text
//! leaf. Equality is structural (key plus optional index), which is what
//! selection-translation collaborators must rely on.

use crate::key::Key;

/// One cursor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub key: Key,
    /// Character offset, present only for text-bearing leaves.
    pub index: Option<usize>,
}

impl Point {
    /// Node-level point.
    pub fn node(key: Key) -> Self {
        Self { key, index: None }
    }

    /// Character-level point inside a text leaf.
    pub fn offset(key: Key, index: usize) -> Self {
        Self {
            key,
            index: Some(index),
        }
    }
}

/// A selection range; collapsed when both endpoints are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub start: Point,
    pub end: Point,
}

impl Cursor {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}
