//! Change notification.
//!
//! Observers are plain closures held in an ordered [`Listeners`] list and
//! called synchronously, in registration order, when the owner reports a
//! change. [`ObservableMap`] is the key-value view model pages hand to a
//! renderer; every mutation is reported as a [`MapChanged`] event.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// An ordered list of callbacks for events of type `E`.
pub struct Listeners<E> {
    callbacks: Vec<Box<dyn FnMut(&E)>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: impl FnMut(&E) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn notify(&mut self, event: &E) {
        for callback in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// A named property took a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
    pub property: &'static str,
}

/// Store `value` into `storage` and notify listeners, unless nothing changed.
///
/// Returns whether the value was different.
pub fn set_property<T: PartialEq>(
    storage: &mut T,
    value: T,
    property: &'static str,
    listeners: &mut Listeners<PropertyChanged>,
) -> bool {
    if *storage == value {
        return false;
    }
    *storage = value;
    listeners.notify(&PropertyChanged { property });
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    Inserted,
    Changed,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapChanged {
    pub change: CollectionChange,
    pub key: String,
}

/// Ordered string-keyed map of JSON values that reports every mutation.
#[derive(Debug, Default)]
pub struct ObservableMap {
    entries: BTreeMap<String, Value>,
    listeners: Listeners<MapChanged>,
}

impl ObservableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, callback: impl FnMut(&MapChanged) + 'static) {
        self.listeners.add(callback);
    }

    /// Insert or replace. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        let previous = self.entries.insert(key.clone(), value);
        let change = if previous.is_some() {
            CollectionChange::Changed
        } else {
            CollectionChange::Inserted
        };
        self.listeners.notify(&MapChanged { change, key });
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key)?;
        self.listeners.notify(&MapChanged {
            change: CollectionChange::Removed,
            key: key.to_string(),
        });
        Some(removed)
    }

    /// Empty the map, reporting one removal per prior key.
    pub fn clear(&mut self) {
        let prior = std::mem::take(&mut self.entries);
        for key in prior.into_keys() {
            self.listeners.notify(&MapChanged {
                change: CollectionChange::Removed,
                key,
            });
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}
