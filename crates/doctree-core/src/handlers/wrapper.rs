//! Wrapped-single-child kinds (paragraph around text).

use crate::handler::{build, handler_for, try_build, Command, NodeHandler};
use crate::value::{expect_kind, field, ValueError};
use doctree_store::{DocStore, Entry, Index, Key, NodeKind, NodeValue, Point};
use serde_json::{json, Value};

pub struct WrapperHandler {
    pub kind: NodeKind,
    pub child: NodeKind,
}

impl WrapperHandler {
    fn child_entry(&self, store: &DocStore, key: Key) -> Entry {
        store.entry(store.entry(key).child())
    }
}

impl NodeHandler for WrapperHandler {
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
        let content = field(value, self.kind, "content")?;
        try_build(store, self.kind, parent, |store, key| {
            let child = handler_for(self.child).insert(store, Some(key), content)?;
            Ok(NodeValue::Child(child.key))
        })
    }

    fn create_empty(&self, store: &mut DocStore, parent: Option<Key>) -> Entry {
        build(store, self.kind, parent, |store, key| {
            let child = handler_for(self.child).create_empty(store, Some(key));
            NodeValue::Child(child.key)
        })
    }

    fn read(&self, store: &DocStore, key: Key) -> Value {
        let child = store.entry(key).child();
        json!({
            "kind": self.kind.tag(),
            "content": handler_for(self.child).read(store, child),
        })
    }

    fn start_point(&self, store: &DocStore, entry: &Entry) -> Point {
        let child = self.child_entry(store, entry.key);
        handler_for(self.child).start_point(store, &child)
    }

    fn end_point(&self, store: &DocStore, entry: &Entry) -> Point {
        let child = self.child_entry(store, entry.key);
        handler_for(self.child).end_point(store, &child)
    }

    // Descent through a wrapper consumes no index.
    fn select(&self, store: &mut DocStore, entry: &Entry, path: &[Index]) {
        let child = self.child_entry(store, entry.key);
        handler_for(self.child).select(store, &child, path);
    }

    fn split(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        path: &[Index],
        new_parent: Option<Key>,
    ) -> Option<(Entry, Entry)> {
        let child = self.child_entry(store, entry.key);
        let parent = new_parent.or(entry.parent);
        // The right wrapper is reserved first so the child's right half can
        // be parented to it; a declined child split aborts the insert and
        // leaves the tree untouched.
        let right = store.insert(self.kind, parent, |store, key| {
            let (_, right_child) = handler_for(self.child).split(store, &child, path, Some(key))?;
            Some(NodeValue::Child(right_child.key))
        })?;
        let left = store.entry(entry.key);
        Some((left, right))
    }

    fn merge(&self, store: &mut DocStore, entry: &Entry, with: &Entry) -> bool {
        if with.kind != self.kind {
            return false;
        }
        let own = self.child_entry(store, entry.key);
        let other = self.child_entry(store, with.key);
        handler_for(self.child).merge(store, &own, &other)
    }

    fn index_of(&self, entry: &Entry, child: Key) -> Option<Index> {
        if entry.child() == child {
            None
        } else {
            panic!("{} is not the child of wrapper {}", child, entry.key)
        }
    }

    fn command(
        &self,
        _store: &mut DocStore,
        _entry: &Entry,
        _command: &Command,
        _start: &[Index],
        _end: &[Index],
    ) -> bool {
        // Leaf commands resolve below, structural ones above.
        false
    }
}
