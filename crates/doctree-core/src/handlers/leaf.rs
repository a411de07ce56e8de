//! Primitive leaves: the string leaf carries the canonical command
//! semantics every other kind delegates to or declines.

use crate::handler::{build, Command, NodeHandler};
use crate::value::ValueError;
use doctree_store::{Cursor, DocStore, Entry, Index, Key, NodeKind, NodeValue, Point};
use serde_json::Value;

// ── TextHandler ───────────────────────────────────────────────────────────

/// String leaf. Offsets are character offsets, not byte offsets.
pub struct TextHandler;

fn chars_of(store: &DocStore, key: Key) -> Vec<char> {
    store.entry(key).text().chars().collect()
}

/// Leading character offset of a narrowed leaf path, or `None` when the
/// point is node-level. Anything else is a malformed path for a leaf.
fn leaf_offset(path: &[Index]) -> Option<usize> {
    match path {
        [] => None,
        [Index::Pos(i)] => Some(*i),
        other => panic!("invalid index path for a leaf: {other:?}"),
    }
}

impl NodeHandler for TextHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Text
    }

    fn insert(
        &self,
        store: &mut DocStore,
        parent: Option<Key>,
        value: &Value,
    ) -> Result<Entry, ValueError> {
        let text = value.as_str().ok_or(ValueError::ExpectedString)?.to_string();
        Ok(build(store, NodeKind::Text, parent, |_, _| {
            NodeValue::Str(text)
        }))
    }

    fn create_empty(&self, store: &mut DocStore, parent: Option<Key>) -> Entry {
        build(store, NodeKind::Text, parent, |_, _| {
            NodeValue::Str(String::new())
        })
    }

    fn read(&self, store: &DocStore, key: Key) -> Value {
        Value::String(store.entry(key).text().to_string())
    }

    fn start_point(&self, _store: &DocStore, entry: &Entry) -> Point {
        Point::offset(entry.key, 0)
    }

    fn end_point(&self, store: &DocStore, entry: &Entry) -> Point {
        Point::offset(entry.key, chars_of(store, entry.key).len())
    }

    fn select(&self, store: &mut DocStore, entry: &Entry, path: &[Index]) {
        let point = match leaf_offset(path) {
            None => Point::node(entry.key),
            Some(offset) => {
                let len = chars_of(store, entry.key).len();
                assert!(offset <= len, "offset {offset} out of range for {}", entry.key);
                Point::offset(entry.key, offset)
            }
        };
        store.set_cursor(Some(Cursor::collapsed(point)));
    }

    fn split(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        path: &[Index],
        new_parent: Option<Key>,
    ) -> Option<(Entry, Entry)> {
        let offset = leaf_offset(path)?;
        let chars = chars_of(store, entry.key);
        assert!(
            offset <= chars.len(),
            "split offset {offset} out of range for {}",
            entry.key
        );
        if offset == chars.len() {
            return None; // nothing to move right
        }
        let left: String = chars[..offset].iter().collect();
        let right: String = chars[offset..].iter().collect();
        let parent = new_parent.or(entry.parent);
        let left_entry = store.replace(entry.key, NodeValue::Str(left));
        let right_entry = build(store, NodeKind::Text, parent, |_, _| NodeValue::Str(right));
        Some((left_entry, right_entry))
    }

    fn merge(&self, store: &mut DocStore, entry: &Entry, with: &Entry) -> bool {
        if with.kind != NodeKind::Text {
            return false;
        }
        let tail = store.entry(with.key).text().to_string();
        store.update(entry.key, |old| match old {
            NodeValue::Str(s) => NodeValue::Str(format!("{s}{tail}")),
            other => panic!("entry {} is not a string leaf: {other:?}", entry.key),
        });
        true
    }

    fn index_of(&self, entry: &Entry, child: Key) -> Option<Index> {
        panic!("text leaf {} has no child {child}", entry.key)
    }

    fn command(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        command: &Command,
        start: &[Index],
        end: &[Index],
    ) -> bool {
        let (Some(start), Some(end)) = (leaf_offset(start), leaf_offset(end)) else {
            return false;
        };
        let mut chars = chars_of(store, entry.key);
        match command {
            Command::InsertText(text) => {
                if start != end || start > chars.len() {
                    return false; // ranges are reduced before insertion
                }
                let inserted: Vec<char> = text.chars().collect();
                let caret = start + inserted.len();
                chars.splice(start..start, inserted);
                self.commit(store, entry.key, chars, caret);
                true
            }
            Command::DeleteRange => {
                if start >= end || end > chars.len() {
                    return false;
                }
                chars.drain(start..end);
                self.commit(store, entry.key, chars, start);
                true
            }
            Command::DeleteForward => {
                if start != end || start >= chars.len() {
                    return false; // at the boundary an ancestor merges instead
                }
                chars.remove(start);
                self.commit(store, entry.key, chars, start);
                true
            }
            Command::DeleteBackward => {
                if start != end || start == 0 {
                    return false;
                }
                chars.remove(start - 1);
                self.commit(store, entry.key, chars, start - 1);
                true
            }
            _ => false,
        }
    }
}

impl TextHandler {
    fn commit(&self, store: &mut DocStore, key: Key, chars: Vec<char>, caret: usize) {
        store.replace(key, NodeValue::Str(chars.into_iter().collect()));
        store.set_cursor(Some(Cursor::collapsed(Point::offset(key, caret))));
    }
}

// ── FlagHandler ───────────────────────────────────────────────────────────

/// Boolean leaf. Not text-bearing: points on it are always node-level and
/// every command declines.
pub struct FlagHandler;

impl NodeHandler for FlagHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Checkbox
    }

    fn insert(
        &self,
        store: &mut DocStore,
        parent: Option<Key>,
        value: &Value,
    ) -> Result<Entry, ValueError> {
        let flag = value.as_bool().ok_or(ValueError::ExpectedBool)?;
        Ok(build(store, NodeKind::Checkbox, parent, |_, _| {
            NodeValue::Flag(flag)
        }))
    }

    fn create_empty(&self, store: &mut DocStore, parent: Option<Key>) -> Entry {
        build(store, NodeKind::Checkbox, parent, |_, _| {
            NodeValue::Flag(false)
        })
    }

    fn read(&self, store: &DocStore, key: Key) -> Value {
        Value::Bool(store.entry(key).flag())
    }

    fn start_point(&self, _store: &DocStore, entry: &Entry) -> Point {
        Point::node(entry.key)
    }

    fn end_point(&self, _store: &DocStore, entry: &Entry) -> Point {
        Point::node(entry.key)
    }

    fn select(&self, store: &mut DocStore, entry: &Entry, path: &[Index]) {
        assert!(path.is_empty(), "invalid index path for a boolean leaf: {path:?}");
        store.set_cursor(Some(Cursor::collapsed(Point::node(entry.key))));
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
        panic!("boolean leaf {} has no child {child}", entry.key)
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
