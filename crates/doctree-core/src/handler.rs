//! The per-kind operation contract and the handler table.

use crate::handlers::{ArrayHandler, FlagHandler, ObjectHandler, TextHandler, WrapperHandler};
use crate::value::ValueError;
use doctree_store::{Cursor, DocStore, Entry, Index, Key, NodeKind, NodeValue, Point};
use serde_json::Value;

/// An editing intent routed through the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InsertText(String),
    InsertNewElement,
    DeleteRange,
    DeleteForward,
    DeleteBackward,
    /// Document-level: insert an empty paragraph after the cursor's block.
    AddParagraph,
    /// Document-level: insert an empty multiple-choice block likewise.
    AddMultipleChoice,
}

/// Shared operation contract, one implementation per node kind.
///
/// Operations that return `Option`/`bool` use `None`/`false` as the decline
/// signal: "this kind cannot satisfy the operation in this context". A
/// decline must be side-effect-free so the dispatcher can retry one level
/// up without leaving a partially mutated tree behind.
///
/// Entries passed in are snapshots; implementations re-fetch by key before
/// mutating and never hold an entry across store writes.
pub trait NodeHandler: Sync {
    fn kind(&self) -> NodeKind;

    /// Builds a subtree from an external kind-tagged value.
    fn insert(
        &self,
        store: &mut DocStore,
        parent: Option<Key>,
        value: &Value,
    ) -> Result<Entry, ValueError>;

    /// Builds a minimal valid instance of the kind. Array kinds provision
    /// exactly one empty child; they are never created childless.
    fn create_empty(&self, store: &mut DocStore, parent: Option<Key>) -> Entry;

    /// Inverse of `insert`: reconstructs the external representation.
    fn read(&self, store: &DocStore, key: Key) -> Value;

    /// Canonical position at the very beginning of this subtree.
    fn start_point(&self, store: &DocStore, entry: &Entry) -> Point;

    /// Canonical position at the very end of this subtree.
    fn end_point(&self, store: &DocStore, entry: &Entry) -> Point;

    fn select_start(&self, store: &mut DocStore, entry: &Entry) {
        let point = self.start_point(store, entry);
        store.set_cursor(Some(Cursor::collapsed(point)));
    }

    fn select_end(&self, store: &mut DocStore, entry: &Entry) {
        let point = self.end_point(store, entry);
        store.set_cursor(Some(Cursor::collapsed(point)));
    }

    /// Collapses the cursor partway into the subtree following `path`;
    /// with an exhausted path the cursor lands on the node itself.
    ///
    /// # Panics
    /// Panics when the path shape is invalid for the kind.
    fn select(&self, store: &mut DocStore, entry: &Entry, path: &[Index]);

    /// Divides the node at `path` into a left remainder (mutated in place)
    /// and a freshly inserted right remainder parented to `new_parent`
    /// (defaulting to the node's own parent). `None` when the kind is not
    /// splittable or the split point is degenerate.
    fn split(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        path: &[Index],
        new_parent: Option<Key>,
    ) -> Option<(Entry, Entry)>;

    /// Folds `with` into `entry` (same kind only). On success the consumed
    /// entry is left orphaned for the caller to excise from its parent.
    fn merge(&self, store: &mut DocStore, entry: &Entry, with: &Entry) -> bool;

    /// Address of a direct child within this entry's value; `None` for
    /// wrapper kinds, whose single child has no address of its own.
    ///
    /// # Panics
    /// Panics when `child` is not a direct child of `entry`.
    fn index_of(&self, entry: &Entry, child: Key) -> Option<Index>;

    /// Attempts a command with start/end index paths narrowed to this node.
    /// `false` is the decline signal that drives ancestor bubbling.
    fn command(
        &self,
        store: &mut DocStore,
        entry: &Entry,
        command: &Command,
        start: &[Index],
        end: &[Index],
    ) -> bool;
}

static TEXT: TextHandler = TextHandler;
static CHECKBOX: FlagHandler = FlagHandler;
static PARAGRAPH: WrapperHandler = WrapperHandler {
    kind: NodeKind::Paragraph,
    child: NodeKind::Text,
};
static DOC: ArrayHandler = ArrayHandler {
    kind: NodeKind::Doc,
    empty_child: NodeKind::Paragraph,
};
static ANSWERS: ArrayHandler = ArrayHandler {
    kind: NodeKind::Answers,
    empty_child: NodeKind::Answer,
};
static MULTIPLE_CHOICE: ObjectHandler = ObjectHandler {
    kind: NodeKind::MultipleChoice,
    slots: &[
        ("task", NodeKind::Paragraph),
        ("answers", NodeKind::Answers),
    ],
};
static ANSWER: ObjectHandler = ObjectHandler {
    kind: NodeKind::Answer,
    slots: &[
        ("checked", NodeKind::Checkbox),
        ("label", NodeKind::Text),
    ],
};

/// Handler lookup by kind tag.
pub fn handler_for(kind: NodeKind) -> &'static dyn NodeHandler {
    match kind {
        NodeKind::Doc => &DOC,
        NodeKind::Paragraph => &PARAGRAPH,
        NodeKind::Text => &TEXT,
        NodeKind::MultipleChoice => &MULTIPLE_CHOICE,
        NodeKind::Answers => &ANSWERS,
        NodeKind::Answer => &ANSWER,
        NodeKind::Checkbox => &CHECKBOX,
    }
}

/// Infallible two-phase construction; the callback always yields a value.
pub(crate) fn build<F>(store: &mut DocStore, kind: NodeKind, parent: Option<Key>, f: F) -> Entry
where
    F: FnOnce(&mut DocStore, Key) -> NodeValue,
{
    store
        .insert(kind, parent, |store, key| Some(f(store, key)))
        .expect("non-aborting insert")
}

/// Two-phase construction whose callback may fail with a `ValueError`;
/// a failure aborts the insert through the store's sentinel.
pub(crate) fn try_build<F>(
    store: &mut DocStore,
    kind: NodeKind,
    parent: Option<Key>,
    f: F,
) -> Result<Entry, ValueError>
where
    F: FnOnce(&mut DocStore, Key) -> Result<NodeValue, ValueError>,
{
    let mut failure = None;
    let entry = store.insert(kind, parent, |store, key| match f(store, key) {
        Ok(value) => Some(value),
        Err(e) => {
            failure = Some(e);
            None
        }
    });
    match entry {
        Some(entry) => Ok(entry),
        None => Err(failure.expect("aborted insert records its error")),
    }
}
