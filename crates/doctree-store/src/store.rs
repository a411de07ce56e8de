//! The writable entry store.
//!
//! `DocStore` is the single shared mutable resource of the editing core. It
//! owns a storage backend, the cursor, and the update counter. Reads go
//! through `&DocStore`, mutation through `&mut DocStore`; that borrow split
//! is the read-only/writable capability boundary.
//!
//! Missing keys and shape mismatches are programming-error-class failures
//! and panic; they are never part of normal control flow.

use crate::backend::StorageBackend;
use crate::cursor::Cursor;
use crate::entry::{Entry, NodeValue};
use crate::key::{Key, NodeKind};
use std::cell::Cell;
use std::rc::Rc;

pub struct DocStore {
    backend: Box<dyn StorageBackend>,
    cursor: Option<Cursor>,
    update_count: u64,
    next_seq: Rc<Cell<u64>>,
    seq_observer: u64,
}

impl DocStore {
    /// Wraps a backend. Picks up any entries already present (and the next
    /// free sequence number), so re-opening a populated shared map works.
    pub fn new(mut backend: Box<dyn StorageBackend>) -> Self {
        let mut max_seq = 0;
        for (raw, _) in backend.entries() {
            if let Ok(key) = raw.parse::<Key>() {
                max_seq = max_seq.max(key.seq + 1);
            }
        }
        let next_seq = Rc::new(Cell::new(max_seq));
        // Writes from other handles of a shared backend must also advance
        // the sequence floor, or two stores could hand out the same key.
        let floor = Rc::clone(&next_seq);
        let seq_observer = backend.observe(Box::new(move |raw| {
            if let Ok(key) = raw.parse::<Key>() {
                floor.set(floor.get().max(key.seq + 1));
            }
        }));
        Self {
            backend,
            cursor: None,
            update_count: 0,
            next_seq,
            seq_observer,
        }
    }

    // ── Read level ────────────────────────────────────────────────────────

    /// Fetches an entry.
    ///
    /// # Panics
    /// Panics when the key is absent or the stored payload does not decode;
    /// callers must not query keys they did not obtain from this tree.
    pub fn entry(&self, key: Key) -> Entry {
        let raw = key.to_string();
        let payload = self
            .backend
            .get(&raw)
            .unwrap_or_else(|| panic!("no entry stored for key {key}"));
        serde_json::from_value(payload)
            .unwrap_or_else(|e| panic!("entry {key} failed to decode: {e}"))
    }

    pub fn try_entry(&self, key: Key) -> Option<Entry> {
        let payload = self.backend.get(&key.to_string())?;
        serde_json::from_value(payload).ok()
    }

    /// Every decodable entry in the backend, in key order.
    pub fn entries(&self) -> Vec<Entry> {
        self.backend
            .entries()
            .into_iter()
            .filter_map(|(_, payload)| serde_json::from_value(payload).ok())
            .collect()
    }

    /// The entry whose parent is `None`, if the tree has been seeded.
    pub fn root(&self) -> Option<Entry> {
        self.entries().into_iter().find(|e| e.parent.is_none())
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Total mutations applied through this store (inserts, updates and
    /// cursor changes all count).
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    // ── Write level ───────────────────────────────────────────────────────

    /// Two-phase insert: reserves a fresh key for `kind`, hands it to
    /// `create` (which may itself insert children parented to that key),
    /// and commits the produced value. When `create` returns `None` nothing
    /// is stored and `None` is returned — the abort sentinel used by
    /// structural operations that discover mid-flight there is nothing to
    /// create. The reserved sequence number is consumed either way.
    pub fn insert<F>(&mut self, kind: NodeKind, parent: Option<Key>, create: F) -> Option<Entry>
    where
        F: FnOnce(&mut DocStore, Key) -> Option<NodeValue>,
    {
        let key = self.reserve_key(kind);
        let value = create(self, key)?;
        let entry = Entry {
            kind,
            key,
            parent,
            value,
        };
        self.commit(&entry);
        Some(entry)
    }

    /// Rewrites the value at `key` through a pure function of the old value.
    pub fn update<F>(&mut self, key: Key, f: F) -> Entry
    where
        F: FnOnce(&NodeValue) -> NodeValue,
    {
        let mut entry = self.entry(key);
        entry.value = f(&entry.value);
        self.commit(&entry);
        entry
    }

    /// Rewrites the value at `key` in place.
    pub fn replace(&mut self, key: Key, value: NodeValue) -> Entry {
        self.update(key, |_| value)
    }

    pub fn set_cursor(&mut self, cursor: Option<Cursor>) {
        self.cursor = cursor;
        self.update_count += 1;
    }

    /// Registers a backend observer; fires after every committed write,
    /// including writes issued by other handles of a shared backend.
    pub fn on_change<F>(&mut self, observer: F) -> u64
    where
        F: FnMut(&str) + 'static,
    {
        self.backend.observe(Box::new(observer))
    }

    pub fn off_change(&mut self, id: u64) -> bool {
        self.backend.unobserve(id)
    }

    fn reserve_key(&mut self, kind: NodeKind) -> Key {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        Key::new(seq, kind)
    }

    fn commit(&mut self, entry: &Entry) {
        let payload = serde_json::to_value(entry)
            .unwrap_or_else(|e| panic!("entry {} failed to encode: {e}", entry.key));
        self.backend.set(&entry.key.to_string(), payload);
        self.update_count += 1;
    }
}

impl Drop for DocStore {
    fn drop(&mut self) {
        self.backend.unobserve(self.seq_observer);
    }
}
