//! Command dispatch: lowest-common-ancestor detection, index narrowing and
//! ancestor-bubbling retry.

use crate::handler::handler_for;
use crate::path::{path_to_root, Frame};
use doctree_store::{DocStore, Index, NodeKind, NodeValue};

pub use crate::handler::Command;

/// Routes a command to the deepest entry containing both cursor endpoints,
/// retrying on progressively higher ancestors until one accepts. Returns
/// `false` when the ancestor chain is exhausted without success; with no
/// cursor set there is nothing to act on and the dispatch is a no-op
/// success.
pub fn dispatch_command(store: &mut DocStore, command: &Command) -> bool {
    match command {
        Command::AddParagraph => return insert_block(store, NodeKind::Paragraph),
        Command::AddMultipleChoice => return insert_block(store, NodeKind::MultipleChoice),
        _ => {}
    }
    let Some(cursor) = store.cursor() else {
        return true;
    };
    if !matches!(command, Command::DeleteRange) && !cursor.is_collapsed() {
        // Reduce the range first; only then does the command itself apply.
        if !dispatch_command(store, &Command::DeleteRange) {
            return false;
        }
        if matches!(command, Command::DeleteForward | Command::DeleteBackward) {
            return true; // the range deletion already satisfied the intent
        }
    }
    let Some(cursor) = store.cursor() else {
        return true;
    };
    let start = path_to_root(store, &cursor.start);
    let end = path_to_root(store, &cursor.end);
    let lca = common_depth(&start, &end);
    for depth in (0..=lca).rev() {
        let entry = start[depth].entry.clone();
        let start_path: Vec<Index> = start[depth..].iter().filter_map(|f| f.index).collect();
        let end_path: Vec<Index> = end[depth..].iter().filter_map(|f| f.index).collect();
        if handler_for(entry.kind).command(store, &entry, command, &start_path, &end_path) {
            return true;
        }
    }
    false
}

/// Depth of the lowest common ancestor of two root-first chains.
///
/// Divergence is detected at the first index mismatch, not at entry
/// identity alone: two node-level points on different children of one
/// array meet at that array, not at its parent.
fn common_depth(start: &[Frame], end: &[Frame]) -> usize {
    let max = start.len().min(end.len());
    let mut depth = 0;
    loop {
        let next = depth + 1;
        if next >= max
            || start[depth].index != end[depth].index
            || start[next].entry.key != end[next].entry.key
        {
            break;
        }
        depth = next;
    }
    depth
}

/// Document-level structural insertion: a fresh empty block right after
/// the cursor's top-level block (appended when there is no cursor).
fn insert_block(store: &mut DocStore, kind: NodeKind) -> bool {
    let Some(root) = store.root() else {
        return false;
    };
    let mut children = root.children().to_vec();
    let at = store
        .cursor()
        .and_then(|cursor| {
            path_to_root(store, &cursor.start)
                .first()
                .and_then(|frame| frame.index)
        })
        .map(|index| match index {
            Index::Pos(i) => i + 1,
            Index::Slot(name) => panic!("document root addressed by slot name {name:?}"),
        })
        .unwrap_or(children.len())
        .min(children.len());
    let fresh = handler_for(kind).create_empty(store, Some(root.key));
    children.insert(at, fresh.key);
    store.replace(root.key, NodeValue::Children(children));
    handler_for(kind).select_start(store, &fresh);
    true
}
