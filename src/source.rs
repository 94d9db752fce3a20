//! Storage sources and the first-match lookup chain.
//!
//! A [`Source`] is a loaded, read-only mapping from [`Key`] to raw
//! [`Value`] — one instance per backing store (environment snapshot, parsed
//! file, in-memory map). A [`Chain`] composes sources in priority order and
//! resolves each key against the first source that contains it.
//!
//! Precedence is per fully-qualified key: a source either has a key or it
//! does not, and the first hit wins. There is no deep merging of partial
//! structures across sources.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ConfigError;
use crate::flatten;
use crate::key::Key;
use crate::value::Value;

/// A loaded, read-only mapping from [`Key`] to raw [`Value`].
///
/// All loading (reading the environment, parsing a file) happens eagerly at
/// construction; `get` never performs I/O. Sources must not be mutated after
/// construction — [`DictSource`] is the explicit test/mutation exception.
pub trait Source: fmt::Debug {
    /// Look up a key. `None` means this source does not contain it.
    fn get(&self, key: &Key) -> Option<Value>;

    /// Look up a key, falling back to `default` when absent.
    fn get_or(&self, key: &Key, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }
}

/// Ordered composition of sources implementing first-match precedence.
///
/// The first source in the list has the highest priority. Chains are cheap
/// to clone and are shared by reference between a config and its nested
/// configs.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    sources: Vec<Arc<dyn Source>>,
}

impl Chain {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    /// Return the value from the first source (in declaration order) that
    /// contains `key`.
    pub fn resolve(&self, key: &Key) -> Option<Value> {
        self.sources.iter().find_map(|source| source.get(key))
    }

    /// Like [`resolve`](Self::resolve), but returns `default` when no source
    /// contains the key.
    pub fn resolve_or(&self, key: &Key, default: Value) -> Value {
        self.resolve(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// In-memory source.
///
/// This is the explicit test/mutation source: entries can be inserted after
/// construction through a shared reference. Like the rest of the crate it is
/// single-threaded; the interior `RefCell` makes the compiler enforce that.
#[derive(Debug, Default)]
pub struct DictSource {
    entries: RefCell<HashMap<Key, Value>>,
}

impl DictSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any `Serialize` value. Nested structs and maps become key
    /// paths; `Option::None` fields become [`Value::Null`].
    pub fn from_serialize<S: Serialize>(source: &S) -> Result<Self, ConfigError> {
        let dict = Self::new();
        for (key, value) in flatten::from_serialize(source)? {
            dict.entries.borrow_mut().insert(key, value);
        }
        Ok(dict)
    }

    /// Insert or replace an entry. `key` accepts dotted paths (`"db.host"`).
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    /// Remove an entry, returning the previous value if any.
    pub fn unset(&self, key: impl Into<Key>) -> Option<Value> {
        self.entries.borrow_mut().remove(&key.into())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Source for DictSource {
    fn get(&self, key: &Key) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }
}
