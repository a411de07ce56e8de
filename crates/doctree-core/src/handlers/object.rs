//! Keyed-object-of-children kinds: a fixed set of named slots in document
//! order. Pure containers — never split, never merged, all commands
//! declined so ancestors take over.

use crate::handler::{build, handler_for, try_build, Command, NodeHandler};
use crate::value::{expect_kind, field, ValueError};
use doctree_store::{Cursor, DocStore, Entry, Index, Key, NodeKind, NodeValue, Point};
use indexmap::IndexMap;
use serde_json::{Map, Value};

pub struct ObjectHandler {
    pub kind: NodeKind,
    /// Slot name and the kind stored under it, in document order.
    pub slots: &'static [(&'static str, NodeKind)],
}

impl ObjectHandler {
    fn slot_child(&self, store: &DocStore, key: Key, name: &str) -> Entry {
        let entry = store.entry(key);
        let child = *entry
            .slots()
            .get(name)
            .unwrap_or_else(|| panic!("{} has no slot {name:?}", entry.key));
        store.entry(child)
    }
}

impl NodeHandler for ObjectHandler {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn insert(
        &self,
        store: &mut DocStore,
        parent: Option<Key>,
        value: &Value,
    ) -> Result<Entry, ValueError> {
        expect_kind(value, self.kind)?;
        try_build(store, self.kind, parent, |store, key| {
            let mut slots = IndexMap::new();
            for &(name, kind) in self.slots {
                let slot_value = field(value, self.kind, name)?;
                let child = handler_for(kind).insert(store, Some(key), slot_value)?;
                slots.insert(name.to_string(), child.key);
            }
            Ok(NodeValue::Slots(slots))
        })
    }

    fn create_empty(&self, store: &mut DocStore, parent: Option<Key>) -> Entry {
        build(store, self.kind, parent, |store, key| {
            let mut slots = IndexMap::new();
            for &(name, kind) in self.slots {
                let child = handler_for(kind).create_empty(store, Some(key));
                slots.insert(name.to_string(), child.key);
            }
            NodeValue::Slots(slots)
        })
    }

    fn read(&self, store: &DocStore, key: Key) -> Value {
        let entry = store.entry(key);
        let mut out = Map::new();
        out.insert("kind".to_string(), Value::String(self.kind.tag().to_string()));
        for &(name, kind) in self.slots {
            let child = *entry
                .slots()
                .get(name)
                .unwrap_or_else(|| panic!("{} has no slot {name:?}", entry.key));
            out.insert(name.to_string(), handler_for(kind).read(store, child));
        }
        Value::Object(out)
    }

    fn start_point(&self, store: &DocStore, entry: &Entry) -> Point {
        let (name, kind) = self.slots[0];
        let child = self.slot_child(store, entry.key, name);
        handler_for(kind).start_point(store, &child)
    }

    fn end_point(&self, store: &DocStore, entry: &Entry) -> Point {
        let (name, kind) = self.slots[self.slots.len() - 1];
        let child = self.slot_child(store, entry.key, name);
        handler_for(kind).end_point(store, &child)
    }

    fn select(&self, store: &mut DocStore, entry: &Entry, path: &[Index]) {
        match path {
            [] => store.set_cursor(Some(Cursor::collapsed(Point::node(entry.key)))),
            [Index::Slot(name), rest @ ..] => {
                let child = self.slot_child(store, entry.key, name);
                handler_for(child.kind).select(store, &child, rest);
            }
            other => panic!("invalid index path for object {}: {other:?}", entry.key),
        }
    }

    fn split(
        &self,
        _store: &mut DocStore,
        _entry: &Entry,
        _path: &[Index],
        _new_parent: Option<Key>,
    ) -> Option<(Entry, Entry)> {
        None
    }

    fn merge(&self, _store: &mut DocStore, _entry: &Entry, _with: &Entry) -> bool {
        false
    }

    fn index_of(&self, entry: &Entry, child: Key) -> Option<Index> {
        let slots = entry.slots();
        for &(name, _) in self.slots {
            if slots.get(name) == Some(&child) {
                return Some(Index::Slot(name));
            }
        }
        panic!("{} is not a slot child of {}", child, entry.key)
    }

    fn command(
        &self,
        _store: &mut DocStore,
        _entry: &Entry,
        _command: &Command,
        _start: &[Index],
        _end: &[Index],
    ) -> bool {
        false
    }
}
