//! The public façade: batched mutation and change notification.

use crate::dispatch::{dispatch_command, Command};
use crate::handler::handler_for;
use crate::value::ValueError;
use doctree_store::{Cursor, DocStore, Entry, Key, NodeKind, StorageBackend};
use serde_json::Value;
use std::collections::BTreeMap;

/// Delivered once per batch, after the outermost mutation call unwinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Store counter after the batch; counts mutations, not batches.
    pub update_count: u64,
    /// Mutations applied within this batch.
    pub mutations: u64,
}

/// Owns the store, batches nested mutations into one notification and is
/// the dispatch entry point. Construct one per document handle; dropping
/// it releases its backend subscription.
pub struct DocManager {
    store: DocStore,
    depth: u32,
    batch_base: u64,
    listeners: BTreeMap<u64, Box<dyn FnMut(ChangeEvent)>>,
    next_listener: u64,
}

impl DocManager {
    /// Opens a document over the backend, seeding an empty document when
    /// the backend holds no tree yet.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        let mut manager = Self::bare(backend);
        if manager.store.root().is_none() {
            manager.update(|m| {
                handler_for(NodeKind::Doc).create_empty(&mut m.store, None);
            });
        }
        manager
    }

    /// Opens a document over the backend, loading `value` as the initial
    /// content when the backend holds no tree yet.
    pub fn from_value(backend: Box<dyn StorageBackend>, value: &Value) -> Result<Self, ValueError> {
        let mut manager = Self::bare(backend);
        if manager.store.root().is_none() {
            manager.update(|m| {
                handler_for(NodeKind::Doc)
                    .insert(&mut m.store, None, value)
                    .map(|_| ())
            })?;
        }
        Ok(manager)
    }

    fn bare(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            store: DocStore::new(backend),
            depth: 0,
            batch_base: 0,
            listeners: BTreeMap::new(),
            next_listener: 1,
        }
    }

    /// Runs `f` as part of the current batch, opening one if none is in
    /// flight. Nested calls share the outermost notification: listeners
    /// fire once when the outermost call unwinds, and only if the update
    /// counter actually advanced.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        if self.depth == 1 {
            self.batch_base = self.store.update_count();
        }
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 {
            let mutations = self.store.update_count() - self.batch_base;
            if mutations > 0 {
                let event = ChangeEvent {
                    update_count: self.store.update_count(),
                    mutations,
                };
                for listener in self.listeners.values_mut() {
                    listener(event);
                }
            }
        }
        result
    }

    /// Dispatches an editing command as one batch.
    pub fn dispatch(&mut self, command: Command) -> bool {
        self.update(|m| dispatch_command(&mut m.store, &command))
    }

    pub fn on_change<F>(&mut self, listener: F) -> u64
    where
        F: FnMut(ChangeEvent) + 'static,
    {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn off_change(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    // ── Read / render-data hooks ──────────────────────────────────────────

    /// External form of the whole document.
    pub fn read(&self) -> Value {
        match self.store.root() {
            Some(root) => handler_for(root.kind).read(&self.store, root.key),
            None => Value::Null,
        }
    }

    /// External form of one subtree; rendering collaborators resolve the
    /// node for a key through this.
    pub fn read_node(&self, key: Key) -> Value {
        handler_for(key.kind).read(&self.store, key)
    }

    pub fn root(&self) -> Option<Entry> {
        self.store.root()
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.store.cursor()
    }

    /// Replaces the cursor as its own batch.
    pub fn set_cursor(&mut self, cursor: Option<Cursor>) {
        self.update(|m| m.store.set_cursor(cursor));
    }

    pub fn store(&self) -> &DocStore {
        &self.store
    }

    /// Writable store access; mutate through `update` so the batch
    /// notification contract holds.
    pub fn store_mut(&mut self) -> &mut DocStore {
        &mut self.store
    }
}
