//! Array-of-children kinds: ordered sequences of sibling blocks.
//!
//! Arrays never split themselves — their children split, and the command
//! handlers here are responsible for assembling the resulting child list.
//! An array is never left childless: emptying operations back-fill one
//! fresh empty child.

use crate::handler::{build, handler_for, try_build, Command, NodeHandler};
use crate::value::{expect_kind, field, kind_of, ValueError};
use doctree_store::{Cursor, DocStore, Entry, Index, Key, NodeKind, NodeValue, Point};
use serde_json::{json, Value};

pub struct ArrayHandler {
    pub kind: NodeKind,
    /// Kind provisioned when the array needs a fresh empty child.
    pub empty_child: NodeKind,
}

/// Splits off the leading child position of a narrowed array path.
/// `None` for a node-level point on the array itself.
///
/// # Panics
/// Panics on a slot-shaped leading index; arrays are never slot-addressed.
fn leading_pos(path: &[Index]) -> Option<(usize, &[Index])> {
    match path.split_first() {
        Some((&Index::Pos(i), rest)) => Some((i, rest)),
        Some((&Index::Slot(name), _)) => {
            panic!("array child addressed by slot name {name:?}")
        }
        None => None,
    }
}

impl NodeHandler for ArrayHandler {
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
        let content = field(value, self.kind, "content")?
            .as_array()
            .ok_or(ValueError::ExpectedArray { kind: self.kind })?;
        try_build(store, self.kind, parent, |store, key| {
            let mut children = Vec::with_capacity(content.len());
            for item in content {
                let kind = kind_of(item)?;
                let child = handler_for(kind).insert(store, Some(key), item)?;
                children.push(child.key);
            }
            if children.is_empty() {
                let child = handler_for(self.empty_child).create_empty(store, Some(key));
                children.push(child.key);
            }
            Ok(NodeValue::Children(children))
        })
    }

    fn create_empty(&self, store: &mut DocStore, parent: Option<Key>) -> Entry {
        build(store, self.kind, parent, |store, key| {
            let child = handler_for(self.empty_child).create_empty(store, Some(key));
            NodeValue::Children(vec![child.key])
        })
    }

    fn read(&self, store: &DocStore, key: Key) -> Value {
        let entry = store.entry(key);
        let content: Vec<Value> = entry
            .children()
            .iter()
            .map(|&child| handler_for(child.kind).read(store, child))
            .collect();
        json!({ "kind": self.kind.tag(), "content": content })
    }

    fn start_point(&self, store: &DocStore, entry: &Entry) -> Point {
        let first = entry.children()[0];
        let child = store.entry(first);
        handler_for(child.kind).start_point(store, &child)
    }

    fn end_point(&self, store: &DocStore, entry: &Entry) -> Point {
        let last = *entry.children().last().expect("array is never childless");
        let child = store.entry(last);
        handler_for(child.kind).end_point(store, &child)
    }

    fn select(&self, store: &mut DocStore, entry: &Entry, path: &[Index]) {
        match leading_pos(path) {
            None => store.set_cursor(Some(Cursor::collapsed(Point::node(entry.key)))),
            Some((at, rest)) => {
                let children = entry.children();
                assert!(
                    at < children.len(),
                    "child position {at} out of range for {}",
                    entry.key
                );
                let child = store.entry(children[at]);
                handler_for(child.kind).select(store, &child, rest);
            }
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
        entry
            .children()
            .iter()
            .position(|&k| k == child)
            .map(Index::Pos)
            .or_else(|| panic!("{} is not a child of array {}", child, entry.key))
    }

    fn command(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        command: &Command,
        start: &[Index],
        end: &[Index],
    ) -> bool {
        match command {
            Command::InsertNewElement => self.insert_new_element(store, entry, start, end),
            Command::DeleteRange => self.delete_range(store, entry, start, end),
            Command::DeleteForward => self.merge_siblings(store, entry, start, end, true),
            Command::DeleteBackward => self.merge_siblings(store, entry, start, end, false),
            _ => false,
        }
    }
}

impl ArrayHandler {
    /// Splits the child at the cursor (or provisions a fresh empty child at
    /// a boundary or inside an unsplittable child) and splices it in right
    /// after the current position.
    fn insert_new_element(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        start: &[Index],
        end: &[Index],
    ) -> bool {
        if start != end {
            return false;
        }
        let Some((at, rest)) = leading_pos(start) else {
            return false;
        };
        let entry = store.entry(entry.key);
        let mut children = entry.children().to_vec();
        if at >= children.len() {
            return false;
        }
        let fresh = {
            let split = if rest.is_empty() {
                None
            } else {
                let child = store.entry(children[at]);
                handler_for(child.kind).split(store, &child, rest, Some(entry.key))
            };
            match split {
                Some((_, right)) => right,
                None => handler_for(self.empty_child).create_empty(store, Some(entry.key)),
            }
        };
        children.insert(at + 1, fresh.key);
        store.replace(entry.key, NodeValue::Children(children));
        handler_for(fresh.kind).select_start(store, &fresh);
        true
    }

    /// Splits the boundary children, drops the interior, merges the two
    /// remainder halves when they are the same kind, and re-selects at the
    /// start of the deleted range.
    fn delete_range(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        start: &[Index],
        end: &[Index],
    ) -> bool {
        if start == end {
            return false;
        }
        let entry = store.entry(entry.key);
        let children = entry.children().to_vec();
        let (s_at, s_rest) = leading_pos(start).unwrap_or((0, &[]));
        let (e_at, e_rest) = leading_pos(end).unwrap_or((children.len() - 1, &[]));
        if s_at >= e_at || e_at >= children.len() {
            // A same-child range belongs to a deeper handler; an inverted
            // range is not ours to fix.
            return false;
        }

        // Start boundary: truncate in place when splittable; the severed
        // tail stays unlinked. A node-level start point drops the child.
        let keep_start = if s_rest.is_empty() {
            false
        } else {
            let child = store.entry(children[s_at]);
            let _ = handler_for(child.kind).split(store, &child, s_rest, Some(entry.key));
            true
        };

        // End boundary: keep only what lies after the end point. A decline
        // means nothing lies after it, so the whole child is consumed.
        let tail = if e_rest.is_empty() {
            None
        } else {
            let child = store.entry(children[e_at]);
            handler_for(child.kind)
                .split(store, &child, e_rest, Some(entry.key))
                .map(|(_, right)| right)
        };

        let mut next: Vec<Key> = children[..s_at].to_vec();
        if keep_start {
            next.push(children[s_at]);
        }
        if let Some(tail) = &tail {
            let absorbed = keep_start && tail.kind == children[s_at].kind && {
                let head = store.entry(children[s_at]);
                handler_for(head.kind).merge(store, &head, tail)
            };
            if !absorbed {
                next.push(tail.key);
            }
        }
        next.extend_from_slice(&children[e_at + 1..]);

        if next.is_empty() {
            let fresh = handler_for(self.empty_child).create_empty(store, Some(entry.key));
            next.push(fresh.key);
            store.replace(entry.key, NodeValue::Children(next));
            handler_for(fresh.kind).select_start(store, &fresh);
        } else {
            store.replace(entry.key, NodeValue::Children(next.clone()));
            let updated = store.entry(entry.key);
            if keep_start {
                self.select(store, &updated, start);
            } else {
                let child = store.entry(next[s_at.min(next.len() - 1)]);
                handler_for(child.kind).select_start(store, &child);
            }
        }
        true
    }

    /// deleteForward/deleteBackward: folds the current child into its
    /// next/previous same-kind sibling and splices out the consumed slot.
    /// Declines at the respective boundary and with a single child left.
    fn merge_siblings(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        start: &[Index],
        end: &[Index],
        forward: bool,
    ) -> bool {
        if start != end {
            return false;
        }
        let Some((at, _)) = leading_pos(start) else {
            return false;
        };
        let entry = store.entry(entry.key);
        let mut children = entry.children().to_vec();
        if children.len() <= 1 || at >= children.len() {
            return false;
        }
        let (into, consumed) = if forward {
            if at + 1 >= children.len() {
                return false;
            }
            (at, at + 1)
        } else {
            if at == 0 {
                return false;
            }
            (at - 1, at)
        };
        let head = store.entry(children[into]);
        let other = store.entry(children[consumed]);
        // The junction must be captured before the merge grows the head.
        let junction = handler_for(head.kind).end_point(store, &head);
        if !handler_for(head.kind).merge(store, &head, &other) {
            return false;
        }
        children.remove(consumed);
        store.replace(entry.key, NodeValue::Children(children));
        store.set_cursor(Some(Cursor::collapsed(junction)));
        true
    }
}
