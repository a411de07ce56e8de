//! Swappable storage backends.
//!
//! A backend is a flat observable map from key strings to JSON payloads.
//! The editing core above never special-cases a backend: a plain in-process
//! map and a shared multi-writer map satisfy the exact same contract. A
//! backend must never hand back a torn payload; atomicity of one entry's
//! value is the backend's obligation.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Observer callback; receives the key string that changed.
pub type Observer = Box<dyn FnMut(&str)>;

pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    /// All (key, payload) pairs, in key order.
    fn entries(&self) -> Vec<(String, Value)>;
    /// Registers an observer invoked after every `set`. Returns a removal id.
    fn observe(&mut self, observer: Observer) -> u64;
    fn unobserve(&mut self, id: u64) -> bool;
}

// ── LocalBackend ──────────────────────────────────────────────────────────

/// Plain in-process map; observers fire synchronously from `set`.
#[derive(Default)]
pub struct LocalBackend {
    entries: BTreeMap<String, Value>,
    observers: BTreeMap<u64, Observer>,
    next_observer: u64,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for LocalBackend {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        for observer in self.observers.values_mut() {
            observer(key);
        }
    }

    fn entries(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn observe(&mut self, observer: Observer) -> u64 {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.insert(id, observer);
        id
    }

    fn unobserve(&mut self, id: u64) -> bool {
        self.observers.remove(&id).is_some()
    }
}

// ── SharedBackend ─────────────────────────────────────────────────────────

struct SharedState {
    entries: BTreeMap<String, Value>,
    observers: BTreeMap<u64, Observer>,
    next_observer: u64,
}

/// Handle onto a map shared between cooperating writers.
///
/// `fork` produces another handle onto the same state; a write through any
/// handle is visible to reads through every handle and notifies observers
/// registered on any of them. This models a replicated map from the core's
/// point of view: a `get` may reflect a write the local store did not issue.
pub struct SharedBackend {
    state: Rc<RefCell<SharedState>>,
}

impl SharedBackend {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SharedState {
                entries: BTreeMap::new(),
                observers: BTreeMap::new(),
                next_observer: 0,
            })),
        }
    }

    /// Another handle onto the same shared map.
    pub fn fork(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }

    fn notify(&self, key: &str) {
        // Observers run outside the state borrow so they may read the map.
        let mut taken = {
            let mut state = self.state.borrow_mut();
            std::mem::take(&mut state.observers)
        };
        for observer in taken.values_mut() {
            observer(key);
        }
        let mut state = self.state.borrow_mut();
        state.observers.extend(taken);
    }
}

impl Default for SharedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for SharedBackend {
    fn get(&self, key: &str) -> Option<Value> {
        self.state.borrow().entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.state
            .borrow_mut()
            .entries
            .insert(key.to_string(), value);
        self.notify(key);
    }

    fn entries(&self) -> Vec<(String, Value)> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn observe(&mut self, observer: Observer) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_observer;
        state.next_observer += 1;
        state.observers.insert(id, observer);
        id
    }

    fn unobserve(&mut self, id: u64) -> bool {
        self.state.borrow_mut().observers.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn local_backend_notifies_on_set() {
        let mut backend = LocalBackend::new();
        let hits = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&hits);
        let id = backend.observe(Box::new(move |_| seen.set(seen.get() + 1)));
        backend.set("1:text", json!({"v": 1}));
        backend.set("1:text", json!({"v": 2}));
        assert_eq!(hits.get(), 2);
        assert!(backend.unobserve(id));
        backend.set("1:text", json!({"v": 3}));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn shared_backend_fork_sees_writes_and_notifications() {
        let mut a = SharedBackend::new();
        let mut b = a.fork();
        let hits = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&hits);
        b.observe(Box::new(move |_| seen.set(seen.get() + 1)));
        a.set("1:text", json!({"v": 1}));
        assert_eq!(b.get("1:text"), Some(json!({"v": 1})));
        assert_eq!(hits.get(), 1, "observer on the other handle must fire");
    }

    #[test]
    fn shared_backend_observer_may_read_during_notification() {
        let mut a = SharedBackend::new();
        let reader = a.fork();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        a.observe(Box::new(move |key| {
            *sink.borrow_mut() = reader.get(key);
        }));
        a.set("1:text", json!({"v": 7}));
        assert_eq!(*seen.borrow(), Some(json!({"v": 7})));
    }
}
