//! Cursor-point-to-root path resolution.

use crate::handler::handler_for;
use doctree_store::{DocStore, Entry, Index, Point};

/// One step of an ancestor chain. For every frame but the deepest, `index`
/// addresses the next-deeper frame within this entry (`None` across a
/// wrapper, whose child has no address). The deepest frame carries the
/// point's character offset, when it has one.
#[derive(Debug, Clone)]
pub struct Frame {
    pub entry: Entry,
    pub index: Option<Index>,
}

/// Resolves the full ancestor chain of a point, root-first.
///
/// # Panics
/// Panics when the point addresses a key with no stored entry, or when a
/// parent link does not structurally contain its child — both invariant
/// violations of the tree.
pub fn path_to_root(store: &DocStore, point: &Point) -> Vec<Frame> {
    let mut entry = store.entry(point.key);
    let mut frames = vec![Frame {
        entry: entry.clone(),
        index: point.index.map(Index::Pos),
    }];
    while let Some(parent_key) = entry.parent {
        let parent = store.entry(parent_key);
        let index = handler_for(parent.kind).index_of(&parent, entry.key);
        frames.push(Frame {
            entry: parent.clone(),
            index,
        });
        entry = parent;
    }
    frames.reverse();
    frames
}
