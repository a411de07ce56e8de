//! Stored records and child addressing.

use crate::key::{Key, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind-dependent payload of an entry.
///
/// The shape is fixed per kind: array kinds hold `Children`, wrapper kinds
/// hold `Child`, keyed-object kinds hold `Slots`, leaf kinds hold `Str` or
/// `Flag`. Slot order in `Slots` is document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum NodeValue {
    Children(Vec<Key>),
    Child(Key),
    Slots(IndexMap<String, Key>),
    Str(String),
    Flag(bool),
}

/// Address of a child inside its parent's value: an integer position for
/// array kinds, a slot name for keyed-object kinds. Wrapper and leaf kinds
/// have no child address; a text leaf's character offset reuses `Pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Pos(usize),
    Slot(&'static str),
}

/// One stored tree node.
///
/// Entries are snapshots: handlers re-fetch by key on every operation and
/// never hold an entry across store mutations. `key` and `kind` are fixed
/// for the lifetime of the entry; only `value` is ever rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: NodeKind,
    pub key: Key,
    /// `None` only for the document root.
    pub parent: Option<Key>,
    pub value: NodeValue,
}

impl Entry {
    /// Ordered child keys of an array kind.
    ///
    /// # Panics
    /// Panics when the entry is not array-shaped.
    pub fn children(&self) -> &[Key] {
        match &self.value {
            NodeValue::Children(keys) => keys,
            other => panic!("entry {} is not array-shaped: {:?}", self.key, other),
        }
    }

    /// The single child of a wrapper kind.
    ///
    /// # Panics
    /// Panics when the entry is not wrapper-shaped.
    pub fn child(&self) -> Key {
        match &self.value {
            NodeValue::Child(key) => *key,
            other => panic!("entry {} is not wrapper-shaped: {:?}", self.key, other),
        }
    }

    /// Slot table of a keyed-object kind.
    ///
    /// # Panics
    /// Panics when the entry is not object-shaped.
    pub fn slots(&self) -> &IndexMap<String, Key> {
        match &self.value {
            NodeValue::Slots(slots) => slots,
            other => panic!("entry {} is not object-shaped: {:?}", self.key, other),
        }
    }

    /// Scalar of a string leaf.
    ///
    /// # Panics
    /// Panics when the entry is not a string leaf.
    pub fn text(&self) -> &str {
        match &self.value {
            NodeValue::Str(s) => s,
            other => panic!("entry {} is not a string leaf: {:?}", self.key, other),
        }
    }

    /// Scalar of a boolean leaf.
    ///
    /// # Panics
    /// Panics when the entry is not a boolean leaf.
    pub fn flag(&self) -> bool {
        match &self.value {
            NodeValue::Flag(b) => *b,
            other => panic!("entry {} is not a boolean leaf: {:?}", self.key, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_round_trips_through_json_payload() {
        let entry = Entry {
            kind: NodeKind::Paragraph,
            key: Key::new(2, NodeKind::Paragraph),
            parent: Some(Key::new(1, NodeKind::Doc)),
            value: NodeValue::Child(Key::new(3, NodeKind::Text)),
        };
        let payload = serde_json::to_value(&entry).unwrap();
        let back: Entry = serde_json::from_value(payload).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn slot_order_survives_serialization() {
        let mut slots = IndexMap::new();
        slots.insert("task".to_string(), Key::new(5, NodeKind::Paragraph));
        slots.insert("answers".to_string(), Key::new(6, NodeKind::Answers));
        let entry = Entry {
            kind: NodeKind::MultipleChoice,
            key: Key::new(4, NodeKind::MultipleChoice),
            parent: Some(Key::new(1, NodeKind::Doc)),
            value: NodeValue::Slots(slots),
        };
        let payload = serde_json::to_value(&entry).unwrap();
        let back: Entry = serde_json::from_value(payload).unwrap();
        let names: Vec<&String> = back.slots().keys().collect();
        assert_eq!(names, ["task", "answers"]);
    }
}
